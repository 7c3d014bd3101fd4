use crate::error::{Result, SpiderError};
use crate::sec::index::pad_cik;
use crate::sec::FilingTask;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{trace, warn};

/// Reads a `.json` file from `path`.
pub async fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    trace!("reading file path: {path}");
    let file = tokio::fs::read(path).await?;
    trace!("file read; deserializing bytes ...");
    let data: T = serde_json::from_slice(&file)?;
    Ok(data)
}

/// Reads the `cik,period_end` rows of a `.csv` file into filing tasks.
///
/// CIKs are zero-padded to 10 digits; rows with a blank column are skipped, as are rows whose
/// period end is not a `YYYY-MM-DD` date (anything after the date, such as a time, is ignored).
pub async fn read_filing_tasks(path: &str) -> Result<Vec<FilingTask>> {
    trace!("reading file path: {path}");
    let file = tokio::fs::read(path).await?;
    parse_filing_tasks(&file)
}

#[derive(Deserialize)]
struct TaskRow {
    #[serde(default)]
    cik: String,
    #[serde(default)]
    period_end: String,
}

/// Parse CSV bytes with `cik` and `period_end` columns (a UTF-8 BOM is tolerated).
pub fn parse_filing_tasks(bytes: &[u8]) -> Result<Vec<FilingTask>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut tasks = vec![];
    for row in reader.deserialize::<TaskRow>() {
        let row = row?;
        if row.cik.is_empty() || row.period_end.is_empty() {
            continue;
        }
        match parse_period_end(&row.period_end) {
            Ok(period_end) => tasks.push(FilingTask {
                cik: pad_cik(&row.cik),
                period_end,
            }),
            Err(err) => warn!("skipping row for CIK{}: {err}", row.cik),
        }
    }

    Ok(tasks)
}

/// Parse the leading `YYYY-MM-DD` of a period end.
pub fn parse_period_end(text: &str) -> Result<NaiveDate> {
    text.get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .ok_or_else(|| SpiderError::PeriodEnd(text.to_string()))
}
