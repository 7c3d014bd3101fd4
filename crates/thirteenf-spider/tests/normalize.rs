use bigdecimal::BigDecimal;
use serde_json::json;
use std::str::FromStr;
use thirteenf_spider::holdings::normalize::{parse_decimal, to_decimal};
use thirteenf_spider::holdings::{normalize_row, process_payload, UnitMultiplier, UnitResolver};

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

#[test]
fn keyed_row_with_synonyms() {
    let row = json!({ "Issuer_Name": "Foo Corp", "CUSIP": "12345678", "Value_000": "1,234.50" });
    let record = normalize_row(&row).unwrap();

    assert_eq!(record.issuer_name, "Foo Corp");
    assert_eq!(record.cusip, "12345678");
    assert_eq!(record.reported_value, Some(dec("1234.50")));
    assert_eq!(record.shares, None);
    assert_eq!(record.symbol, None);
}

#[test]
fn row_without_identity_is_rejected() {
    assert!(normalize_row(&json!({ "ticker": "FOO", "value": "10" })).is_none());
    // either one missing is enough
    assert!(normalize_row(&json!({ "issuer": "Foo Corp" })).is_none());
    assert!(normalize_row(&json!({ "cusip": "12345678" })).is_none());
    assert!(normalize_row(&json!({ "cusip": " ", "issuer": "Foo Corp" })).is_none());
    assert!(normalize_row(&json!({ "cusip": "12345678", "name": "NaN" })).is_none());
}

#[test]
fn scalars_are_not_rows() {
    assert!(normalize_row(&json!("APPLE INC")).is_none());
    assert!(normalize_row(&json!(null)).is_none());
}

#[test]
fn positional_row() {
    let row = json!(["AAPL", "APPLE INC", "COM", "037833100", "$1,500", "12.5%", "10,000", "SH", "Put"]);
    let record = normalize_row(&row).unwrap();

    assert_eq!(record.symbol.as_deref(), Some("AAPL"));
    assert_eq!(record.issuer_name, "APPLE INC");
    assert_eq!(record.security_class.as_deref(), Some("COM"));
    assert_eq!(record.cusip, "037833100");
    assert_eq!(record.reported_value, Some(dec("1500")));
    assert_eq!(record.percent_of_portfolio, Some(dec("12.5")));
    assert_eq!(record.shares, Some(dec("10000")));
    assert_eq!(record.share_type.as_deref(), Some("SH"));
    assert_eq!(record.option_type.as_deref(), Some("Put"));
}

#[test]
fn positional_row_short_and_long() {
    let short = json!(["", "APPLE INC", "COM", "037833100", 1500]);
    let record = normalize_row(&short).unwrap();
    assert_eq!(record.symbol, None);
    assert_eq!(record.reported_value, Some(dec("1500")));
    assert_eq!(record.percent_of_portfolio, None);
    assert_eq!(record.option_type, None);

    let long = json!(["AAPL", "APPLE INC", "COM", "037833100", "1", "2", "3", "SH", "", "extra", 99]);
    let record = normalize_row(&long).unwrap();
    assert_eq!(record.option_type, None);
    assert_eq!(record.shares, Some(dec("3")));
}

#[test]
fn synonyms_are_checked_in_order() {
    let row = json!({
        "name": "SECOND CHOICE",
        "issuer_name": "FIRST CHOICE",
        "cusip": "12345678",
        "sym": "FC",
        "ticker": "IGNORED",
    });
    let record = normalize_row(&row).unwrap();
    assert_eq!(record.issuer_name, "FIRST CHOICE");
    assert_eq!(record.symbol.as_deref(), Some("FC"));
}

#[test]
fn edgar_element_names() {
    let row = json!({
        "nameOfIssuer": "MICROSOFT CORP",
        "titleOfClass": "COM",
        "cusip": "594918104",
        "value": "4200",
        "sshPrnamt": "100",
        "sshPrnamtType": "SH",
        "putCall": "Call",
    });
    let record = normalize_row(&row).unwrap();
    assert_eq!(record.issuer_name, "MICROSOFT CORP");
    assert_eq!(record.security_class.as_deref(), Some("COM"));
    assert_eq!(record.shares, Some(dec("100")));
    assert_eq!(record.share_type.as_deref(), Some("SH"));
    assert_eq!(record.option_type.as_deref(), Some("Call"));
}

#[test]
fn text_is_trimmed_and_nan_is_absent() {
    let row = json!({ "issuer": "  Foo Corp  ", "cusip": " 12345678 ", "class": "nan", "sym": "" });
    let record = normalize_row(&row).unwrap();
    assert_eq!(record.issuer_name, "Foo Corp");
    assert_eq!(record.cusip, "12345678");
    assert_eq!(record.security_class, None);
    assert_eq!(record.symbol, None);
}

#[test]
fn unparseable_numbers_are_absent() {
    let row = json!({ "issuer": "Foo Corp", "cusip": "12345678", "value": "n/a", "shares": "--" });
    let record = normalize_row(&row).unwrap();
    assert_eq!(record.reported_value, None);
    assert_eq!(record.shares, None);
}

#[test]
fn decimal_cleanup() {
    assert_eq!(parse_decimal("$1,234,567.89"), Some(dec("1234567.89")));
    assert_eq!(parse_decimal(" 12.5% "), Some(dec("12.5")));
    assert_eq!(parse_decimal("-3"), Some(dec("-3")));
    assert_eq!(parse_decimal("1.5e3"), Some(dec("1500")));
    assert_eq!(parse_decimal("$"), None);
    assert_eq!(parse_decimal("abc"), None);
    assert_eq!(parse_decimal("1e100000000"), None);
    assert_eq!(parse_decimal("1e-100000000"), None);
    assert_eq!(parse_decimal("1e64"), Some(dec("1e64")));

    assert_eq!(to_decimal(&json!(42)), Some(dec("42")));
    assert_eq!(to_decimal(&json!(0.25)), Some(dec("0.25")));
    assert_eq!(to_decimal(&json!(null)), None);
    assert_eq!(to_decimal(&json!("NaN")), None);
}

#[test]
fn runaway_exponent_is_absent() {
    let mut rows: Vec<_> = (0..5)
        .map(|i| json!({ "cusip": format!("C{i}"), "issuer": "X", "value": "100", "shares": "1000" }))
        .collect();
    rows.push(json!({ "cusip": "BIG", "issuer": "Y", "value": "1e100000000", "shares": "1" }));

    let resolved = process_payload(&json!({ "data": rows }), None, &UnitResolver::default());
    assert_eq!(resolved.len(), 6);
    assert_eq!(resolved[5].record.reported_value, None);
    assert_eq!(resolved[5].value_usd, None);
    // 500 / 5001 shares: still thousands
    assert_eq!(resolved[0].unit_multiplier, UnitMultiplier::Thousands);
}
