use chrono::NaiveDate;
use thirteenf_spider::fs::{parse_filing_tasks, parse_period_end, read_json};
use thirteenf_spider::SpiderError;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn filing_tasks_from_csv() {
    let csv = "\u{feff}cik,period_end,manager_name\n\
               1067983,2024-09-30,BERKSHIRE\n\
               \u{20}102909 , 2024-06-30 00:00:00 ,VANGUARD\n\
               ,2024-06-30,NO CIK\n\
               55555,,NO PERIOD\n\
               77777,30/06/2024,BAD DATE\n";
    let tasks = parse_filing_tasks(csv.as_bytes()).unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].cik, "0001067983");
    assert_eq!(tasks[0].period_end, date("2024-09-30"));
    assert_eq!(tasks[1].cik, "0000102909");
    assert_eq!(tasks[1].period_end, date("2024-06-30"));
}

#[test]
fn filing_tasks_empty_input() {
    assert!(parse_filing_tasks(b"cik,period_end\n").unwrap().is_empty());
    assert!(parse_filing_tasks(b"").unwrap().is_empty());
}

#[test]
fn period_end_formats() {
    assert_eq!(parse_period_end("2024-12-31").unwrap(), date("2024-12-31"));
    assert_eq!(parse_period_end("2024-12-31T00:00:00").unwrap(), date("2024-12-31"));
    assert!(matches!(
        parse_period_end("2024-1-31"),
        Err(SpiderError::PeriodEnd(_))
    ));
    assert!(parse_period_end("").is_err());
}

#[tokio::test]
async fn read_json_missing_file() {
    let result: Result<serde_json::Value, _> = read_json("./tests/does-not-exist.json").await;
    assert!(matches!(result, Err(SpiderError::Io(_))));
}
