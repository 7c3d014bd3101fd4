use super::{FilingContext, HoldingRecord, ResolvedHolding, UnitMultiplier};
use bigdecimal::{BigDecimal, One, Zero};
use tracing::debug;

/// Cut-offs used by the [`UnitResolver`].
///
/// The defaults are empirical and have no documented derivation.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitThresholds {
    /// A reported total above this cannot be in thousands (25,000,000 thousands is $25T).
    pub extreme_total: BigDecimal,
    /// An average value per share above this cannot be in thousands ($2,000 per share).
    pub implied_price: BigDecimal,
    /// Relative deviation under which two sums are considered to agree.
    pub tolerance: BigDecimal,
}

impl Default for UnitThresholds {
    fn default() -> Self {
        Self {
            extreme_total: BigDecimal::from(25_000_000),
            implied_price: BigDecimal::from(2),
            tolerance: BigDecimal::new(20.into(), 2),
        }
    }
}

/// Which rule settled a filing's multiplier; logged alongside the decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    ExtremeTotal,
    ImpliedPrice,
    Consistency,
    Nominal,
}

/// Per-filing unit inference.
///
/// 13F values are documented as thousands of dollars, but a good share of filers report plain
/// dollars. The resolver picks one multiplier per filing from the sum of the raw values, the
/// share counts, and the total printed on the cover page, and applies it to every holding.
#[derive(Clone, Debug, Default)]
pub struct UnitResolver {
    thresholds: UnitThresholds,
}

impl UnitResolver {
    pub fn new(thresholds: UnitThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &UnitThresholds {
        &self.thresholds
    }

    /// Resolve and apply the multiplier for one filing. An empty filing resolves to nothing.
    ///
    /// ```rust
    /// use bigdecimal::BigDecimal;
    /// use thirteenf_spider::holdings::{FilingContext, UnitResolver};
    ///
    /// let resolved = UnitResolver::default().resolve(FilingContext {
    ///     reported_total_value: Some(BigDecimal::from(1000)),
    ///     holdings: vec![],
    /// });
    /// assert!(resolved.is_empty());
    /// ```
    pub fn resolve(&self, ctx: FilingContext) -> Vec<ResolvedHolding> {
        if ctx.holdings.is_empty() {
            return vec![];
        }
        let multiplier = self.multiplier(&ctx.holdings, ctx.reported_total_value.as_ref());
        apply(ctx.holdings, multiplier)
    }

    /// The single multiplier (1 or 1000) that turns this filing's raw values into dollars.
    pub fn multiplier(
        &self,
        holdings: &[HoldingRecord],
        reported_total: Option<&BigDecimal>,
    ) -> UnitMultiplier {
        let (multiplier, rule) = self.decide(holdings, reported_total);
        debug!(
            "resolved unit multiplier {multiplier} by {rule:?} rule over {} holdings",
            holdings.len()
        );
        multiplier
    }

    /// Same as [`UnitResolver::multiplier`], also reporting which rule decided.
    pub fn decide(
        &self,
        holdings: &[HoldingRecord],
        reported_total: Option<&BigDecimal>,
    ) -> (UnitMultiplier, Rule) {
        let t = &self.thresholds;
        let raw = sum(holdings.iter().filter_map(|h| h.reported_value.as_ref()));
        let total = reported_total.filter(|total| !total.is_zero());

        // 1. a total this large is already dollars; so are holdings that add up to it
        if let Some(total) = total {
            if total > &t.extreme_total
                && raw > BigDecimal::zero()
                && deviation(&raw, total) < t.tolerance
            {
                return (UnitMultiplier::Dollars, Rule::ExtremeTotal);
            }
        }

        // 2. thousands-scaled values would put the average share price in the thousands
        let priced: Vec<&HoldingRecord> = holdings
            .iter()
            .filter(|h| h.shares.as_ref().is_some_and(|s| s > &BigDecimal::zero()))
            .collect();
        let priced_value = sum(priced.iter().filter_map(|h| h.reported_value.as_ref()));
        let priced_shares = sum(priced.iter().filter_map(|h| h.shares.as_ref()));
        if !priced_shares.is_zero() && &priced_value / &priced_shares > t.implied_price {
            return (UnitMultiplier::Dollars, Rule::ImpliedPrice);
        }

        // 3. fall back on whichever reading agrees with the total
        let total = match total {
            Some(total) if !raw.is_zero() => total,
            _ => return (UnitMultiplier::Thousands, Rule::Nominal),
        };
        let as_dollars = deviation(&raw, total);
        let as_thousands = deviation(&(&raw * &BigDecimal::from(1000)), total);
        if as_dollars < as_thousands && as_dollars < t.tolerance {
            (UnitMultiplier::Dollars, Rule::Consistency)
        } else {
            (UnitMultiplier::Thousands, Rule::Consistency)
        }
    }
}

/// Scale every holding of a filing by the same multiplier; other fields pass through.
pub fn apply(holdings: Vec<HoldingRecord>, multiplier: UnitMultiplier) -> Vec<ResolvedHolding> {
    holdings
        .into_iter()
        .map(|record| ResolvedHolding {
            value_usd: record.reported_value.as_ref().map(|v| multiplier.apply(v)),
            unit_multiplier: multiplier,
            record,
        })
        .collect()
}

fn sum<'a>(values: impl Iterator<Item = &'a BigDecimal>) -> BigDecimal {
    values.fold(BigDecimal::zero(), |acc, v| acc + v)
}

/// `|value / anchor - 1|`; `anchor` is never zero here.
fn deviation(value: &BigDecimal, anchor: &BigDecimal) -> BigDecimal {
    (value / anchor - BigDecimal::one()).abs()
}
