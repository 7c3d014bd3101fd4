use bigdecimal::BigDecimal;
use serde::Serialize;

/// Locates the holdings table inside an arbitrarily nested JSON payload.
pub mod shape;

/// Converts one raw table row into a [`HoldingRecord`].
pub mod normalize;

/// Decides whether a filing's monetary figures are dollars or thousands of dollars.
pub mod units;

pub use normalize::normalize_row;
pub use shape::{detect_table, table_root};
pub use units::{UnitResolver, UnitThresholds};

/// One normalized holding, as reported by the filer.
///
/// `reported_value` is still in source units; whether those are dollars or thousands of
/// dollars is only known once the whole filing has gone through the [`UnitResolver`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HoldingRecord {
    pub symbol: Option<String>,
    pub issuer_name: String,
    pub security_class: Option<String>,
    pub cusip: String,
    pub reported_value: Option<BigDecimal>,
    pub percent_of_portfolio: Option<BigDecimal>,
    pub shares: Option<BigDecimal>,
    pub share_type: Option<String>,
    pub option_type: Option<String>,
}

/// A [`HoldingRecord`] with its value scaled to US dollars.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedHolding {
    #[serde(flatten)]
    pub record: HoldingRecord,
    /// `reported_value * unit_multiplier`; absent when the filer reported no value.
    pub value_usd: Option<BigDecimal>,
    pub unit_multiplier: UnitMultiplier,
}

/// Every holding of one filing, plus the aggregate value printed on the cover page.
#[derive(Clone, Debug, Default)]
pub struct FilingContext {
    /// Same ambiguous scale as the holdings.
    pub reported_total_value: Option<BigDecimal>,
    pub holdings: Vec<HoldingRecord>,
}

/// Scale factor turning a reported value into dollars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i64")]
pub enum UnitMultiplier {
    /// Values are already dollars.
    Dollars,
    /// Values are thousands of dollars (the documented 13F format).
    Thousands,
}

impl UnitMultiplier {
    pub fn factor(&self) -> i64 {
        match self {
            UnitMultiplier::Dollars => 1,
            UnitMultiplier::Thousands => 1000,
        }
    }

    /// Scale `value` into dollars.
    pub fn apply(&self, value: &BigDecimal) -> BigDecimal {
        value * &BigDecimal::from(self.factor())
    }
}

impl From<UnitMultiplier> for i64 {
    fn from(multiplier: UnitMultiplier) -> Self {
        multiplier.factor()
    }
}

impl std::fmt::Display for UnitMultiplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.factor())
    }
}

/// Run a whole payload through the pipeline: detect the table, normalize each row (dropping
/// the ones that are not holdings), then resolve the filing's unit scale.
///
/// ```rust
/// use serde_json::json;
/// use thirteenf_spider::holdings::{process_payload, UnitResolver};
///
/// let payload = json!({ "data": [["AAPL", "APPLE INC", "COM", "037833100", "1500", "1.0", "10", "SH", ""]] });
/// let resolved = process_payload(&payload, None, &UnitResolver::default());
/// assert_eq!(resolved.len(), 1);
/// assert_eq!(resolved[0].record.issuer_name, "APPLE INC");
/// ```
pub fn process_payload(
    payload: &serde_json::Value,
    reported_total_value: Option<BigDecimal>,
    resolver: &UnitResolver,
) -> Vec<ResolvedHolding> {
    let rows = detect_table(table_root(payload));
    let holdings: Vec<HoldingRecord> = rows.iter().filter_map(normalize_row).collect();
    tracing::trace!(
        "{} of {} detected rows normalized into holdings",
        holdings.len(),
        rows.len()
    );

    resolver.resolve(FilingContext {
        reported_total_value,
        holdings,
    })
}
