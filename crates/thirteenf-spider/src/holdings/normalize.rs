use super::HoldingRecord;
use bigdecimal::BigDecimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Largest decimal exponent (either sign) accepted from a cell; anything wider is noise, and
/// exact sums over it would have to materialize every digit.
pub const MAX_DECIMAL_EXPONENT: u64 = 64;

/// Canonical holding fields, in the column order of a positional row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Symbol,
    IssuerName,
    SecurityClass,
    Cusip,
    ReportedValue,
    PercentOfPortfolio,
    Shares,
    ShareType,
    OptionType,
}

/// Column order of the positional (list-of-lists) API shape:
/// `[sym, issuer, class, cusip, value, pct, shares, principal, option]`.
pub const POSITIONAL_COLUMNS: [Field; 9] = [
    Field::Symbol,
    Field::IssuerName,
    Field::SecurityClass,
    Field::Cusip,
    Field::ReportedValue,
    Field::PercentOfPortfolio,
    Field::Shares,
    Field::ShareType,
    Field::OptionType,
];

impl Field {
    /// Accepted source key names, checked in order, compared case-insensitively.
    ///
    /// The EDGAR information-table element names (`nameOfIssuer`, `sshPrnamtType`, ...) are
    /// listed alongside the 13f.info ones so both sources share this table.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Field::Symbol => &["sym", "ticker", "symbol"],
            Field::IssuerName => &["issuer_name", "issuer", "name", "issuerName", "nameOfIssuer"],
            Field::SecurityClass => &["class", "cl", "title_of_class", "titleOfClass"],
            Field::Cusip => &["cusip"],
            Field::ReportedValue => &["value_000", "value", "value000", "value_000s"],
            Field::PercentOfPortfolio => &["pct", "percent", "percentage"],
            Field::Shares => &["shares", "share", "sshPrnamt"],
            Field::ShareType => &["principal", "share_type", "shareType", "sshPrnamtType"],
            Field::OptionType => &["option_type", "put_call", "putCall", "optionType"],
        }
    }
}

/// A row's fields, looked up either by position or by synonym.
enum Row<'a> {
    Positional(&'a [Value]),
    Keyed(&'a Map<String, Value>),
}

impl Row<'_> {
    fn get(&self, field: Field) -> Option<&Value> {
        match self {
            Row::Positional(cells) => POSITIONAL_COLUMNS
                .iter()
                .position(|column| *column == field)
                .and_then(|idx| cells.get(idx)),
            Row::Keyed(map) => field.synonyms().iter().find_map(|synonym| {
                map.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(synonym))
                    .map(|(_, value)| value)
            }),
        }
    }

    fn text(&self, field: Field) -> Option<String> {
        self.get(field).and_then(clean_text)
    }

    fn decimal(&self, field: Field) -> Option<BigDecimal> {
        self.get(field).and_then(to_decimal)
    }
}

/// Turn one detected row (a mapping, or a positional sequence) into a [`HoldingRecord`].
///
/// Returns `None` when the row has no usable `cusip` or issuer name; such rows are not
/// holdings and are dropped by the caller.
///
/// ```rust
/// use serde_json::json;
/// use thirteenf_spider::holdings::normalize_row;
///
/// let row = json!({ "Issuer_Name": "Foo Corp", "CUSIP": "12345678", "Value_000": "1,234.50" });
/// let record = normalize_row(&row).unwrap();
/// assert_eq!(record.issuer_name, "Foo Corp");
///
/// assert!(normalize_row(&json!({ "ticker": "FOO" })).is_none());
/// ```
pub fn normalize_row(row: &Value) -> Option<HoldingRecord> {
    let row = match row {
        Value::Array(cells) => Row::Positional(cells),
        Value::Object(map) => Row::Keyed(map),
        _ => return None,
    };

    let cusip = row.text(Field::Cusip)?;
    let issuer_name = row.text(Field::IssuerName)?;

    Some(HoldingRecord {
        symbol: row.text(Field::Symbol),
        issuer_name,
        security_class: row.text(Field::SecurityClass),
        cusip,
        reported_value: row.decimal(Field::ReportedValue),
        percent_of_portfolio: row.decimal(Field::PercentOfPortfolio),
        shares: row.decimal(Field::Shares),
        share_type: row.text(Field::ShareType),
        option_type: row.text(Field::OptionType),
    })
}

/// Trimmed text of a scalar; empty strings and `nan` count as absent.
pub fn clean_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    if text.is_empty() || text.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(text)
    }
}

/// Parse a noisy numeric cell (`"$1,234.50"`, `"12.5%"`, `1.5e3`) as a decimal.
pub fn to_decimal(value: &Value) -> Option<BigDecimal> {
    parse_decimal(&clean_text(value)?)
}

/// Strip thousands separators, currency and percent signs, then parse; `None` on failure or
/// when the exponent exceeds [`MAX_DECIMAL_EXPONENT`].
pub fn parse_decimal(text: &str) -> Option<BigDecimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    let value = BigDecimal::from_str(cleaned).ok()?;
    let (_, scale) = value.as_bigint_and_exponent();
    (scale.unsigned_abs() <= MAX_DECIMAL_EXPONENT).then_some(value)
}
