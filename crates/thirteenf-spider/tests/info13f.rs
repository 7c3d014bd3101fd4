use serde_json::json;
use thirteenf_spider::holdings::{process_payload, UnitMultiplier, UnitResolver};
use thirteenf_spider::info13f::parse_filing_url;
use thirteenf_spider::SpiderError;

#[test]
fn filing_url_parts() {
    let url = "https://13f.info/13f/000091957414001804-kingdon-capital-management-l-l-c-q4-2013";
    let filing = parse_filing_url(url).unwrap();

    assert_eq!(filing.filing_url, url);
    assert_eq!(filing.filing_id, "000091957414001804");
    assert_eq!(filing.cik, "919574");
    assert_eq!(filing.quarter, "Q4 2013");
    assert_eq!(filing.api_url(), "https://13f.info/data/13f/000091957414001804");
    assert_eq!(filing.manager_url(), "https://13f.info/manager/0000919574");
}

#[test]
fn filing_url_variants() {
    let filing =
        parse_filing_url("https://13f.info/13f/000106798324000011-berkshire-hathaway-inc-Q3-2024-new-holdings/")
            .unwrap();
    assert_eq!(filing.cik, "1067983");
    assert_eq!(filing.quarter, "Q3 2024");

    let filing = parse_filing_url("https://13f.info/13f/000000000014001804-zero-q1-2014").unwrap();
    assert_eq!(filing.cik, "0");
}

#[test]
fn filing_url_rejects() {
    for url in [
        "not a url",
        "https://13f.info/manager/0000919574-kingdon-capital-management-l-l-c",
        "https://13f.info/13f/12345-short-id-q4-2013",
        "https://13f.info/13f/000091957414001804-no-quarter",
        "https://13f.info/13f/000091957414001804-bad-quarter-q5-2013",
    ] {
        assert!(
            matches!(parse_filing_url(url), Err(SpiderError::FilingUrl(_))),
            "{url} should not parse"
        );
    }
}

#[test]
fn keyed_api_payload() {
    let rows: Vec<_> = (0..6)
        .map(|i| {
            json!({
                "sym": format!("T{i}"),
                "issuer_name": format!("ISSUER {i}"),
                "class": "COM",
                "cusip": format!("00000000{i}"),
                "value": "1,000",
                "pct": "16.67",
                "shares": "5000",
                "principal": "SH",
                "option_type": null,
            })
        })
        .collect();
    let payload = json!({ "data": rows, "filing": { "quarter": "Q4 2013" } });

    let resolved = process_payload(&payload, None, &UnitResolver::default());
    assert_eq!(resolved.len(), 6);
    assert!(resolved
        .iter()
        .all(|h| h.unit_multiplier == UnitMultiplier::Thousands));
    assert_eq!(resolved[0].record.symbol.as_deref(), Some("T0"));
    assert_eq!(resolved[0].value_usd, Some(bigdecimal::BigDecimal::from(1_000_000)));
}

#[test]
fn positional_api_payload_in_dollars() {
    // $150 a share: values are dollars
    let payload = json!({
        "data": [
            ["AAPL", "APPLE INC", "COM", "037833100", "1500000", "60.0", "10000", "SH", ""],
            ["MSFT", "MICROSOFT CORP", "COM", "594918104", "1000000", "40.0", "2500", "SH", ""],
            ["", "", "", "", "", "", "", "", ""],
        ]
    });

    let resolved = process_payload(&payload, None, &UnitResolver::default());
    assert_eq!(resolved.len(), 2);
    assert!(resolved
        .iter()
        .all(|h| h.unit_multiplier == UnitMultiplier::Dollars));
    assert_eq!(resolved[1].value_usd, Some(bigdecimal::BigDecimal::from(1_000_000)));
}

#[test]
fn payload_without_table() {
    let payload = json!({ "data": { "error": "not found" } });
    assert!(process_payload(&payload, None, &UnitResolver::default()).is_empty());
}
