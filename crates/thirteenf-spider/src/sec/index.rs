use crate::http::SpiderClient;
use chrono::{Datelike, NaiveDate};
use futures::{stream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// A calendar quarter, as EDGAR's `full-index/{year}/QTR{n}` directories are laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quarter {
    pub year: i32,
    pub quarter: u32,
}

impl Quarter {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month() - 1) / 3 + 1,
        }
    }

    pub fn next(&self) -> Self {
        match self.quarter {
            4 => Self {
                year: self.year + 1,
                quarter: 1,
            },
            q => Self {
                year: self.year,
                quarter: q + 1,
            },
        }
    }

    pub fn master_index_url(&self) -> String {
        format!(
            "https://www.sec.gov/Archives/edgar/full-index/{}/QTR{}/master.idx",
            self.year, self.quarter
        )
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Q{}", self.year, self.quarter)
    }
}

/// One 13F line of a quarterly `master.idx`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub form_type: String,
    pub filing_date: NaiveDate,
    /// Accession number without dashes, as used in archive paths.
    pub accession_no: String,
}

impl IndexEntry {
    pub fn is_amendment(&self) -> bool {
        self.form_type.ends_with("/A")
    }
}

/// 13F filings of one quarter, keyed by 10-digit zero-padded CIK.
pub type FilingIndex = HashMap<String, Vec<IndexEntry>>;

/// Parse a `master.idx` body, keeping only 13F forms.
///
/// Lines before the `CIK|...` header are preamble; lines after it look like
/// `CIK|Company Name|Form Type|Date Filed|Filename`.
///
/// ```rust
/// use thirteenf_spider::sec::index::parse_master_index;
///
/// let idx = "Description: Master Index\n\
///            CIK|Company Name|Form Type|Date Filed|Filename\n\
///            --------------------------------------------------------------------------------\n\
///            1067983|BERKSHIRE HATHAWAY INC|13F-HR|2024-11-14|edgar/data/1067983/0000950123-24-011775.txt\n\
///            320193|Apple Inc.|10-K|2024-11-01|edgar/data/320193/0000320193-24-000123.txt\n";
/// let index = parse_master_index(idx);
/// assert_eq!(index["0001067983"][0].accession_no, "000095012324011775");
/// assert!(!index.contains_key("0000320193"));
/// ```
pub fn parse_master_index(text: &str) -> FilingIndex {
    let mut by_cik = FilingIndex::new();

    let Some(header) = text.lines().position(|line| line.starts_with("CIK|")) else {
        return by_cik;
    };

    for line in text.lines().skip(header + 1) {
        let parts: Vec<&str> = line.trim_end().split('|').collect();
        if parts.len() < 5 || !parts[2].starts_with("13F") {
            continue;
        }
        let (cik, form_type, date_filed, filename) = (parts[0], parts[2], parts[3], parts[4]);

        let Ok(filing_date) = NaiveDate::parse_from_str(date_filed, "%Y-%m-%d") else {
            continue;
        };
        let accession_no = filename
            .rsplit('/')
            .next()
            .unwrap_or(filename)
            .trim_end_matches(".txt")
            .replace('-', "");

        by_cik
            .entry(pad_cik(cik))
            .or_default()
            .push(IndexEntry {
                form_type: form_type.to_string(),
                filing_date,
                accession_no,
            });
    }

    by_cik
}

/// Zero-pad a CIK to EDGAR's 10-digit form.
pub fn pad_cik(cik: &str) -> String {
    format!("{:0>10}", cik.trim())
}

/// Quarterly indexes fetched during one run.
///
/// Each quarter is downloaded at most once per cache; a failed download is cached as an empty
/// index so the run does not hammer EDGAR with retries of the same file. Nothing outlives the
/// cache, so a new run starts from scratch.
#[derive(Debug, Default)]
pub struct IndexCache {
    quarters: Mutex<HashMap<Quarter, Arc<FilingIndex>>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a quarter without fetching it.
    pub async fn insert(&self, quarter: Quarter, index: FilingIndex) {
        self.quarters.lock().await.insert(quarter, Arc::new(index));
    }

    pub async fn len(&self) -> usize {
        self.quarters.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.quarters.lock().await.is_empty()
    }

    /// The index of `quarter`, downloading it on first use.
    pub async fn get(&self, client: &SpiderClient, quarter: Quarter) -> Arc<FilingIndex> {
        if let Some(index) = self.quarters.lock().await.get(&quarter) {
            return index.clone();
        }

        let url = quarter.master_index_url();
        let index = match client.get_text(&url).await {
            Ok(text) => {
                let index = parse_master_index(&text);
                info!("indexed {quarter}: {} managers", index.len());
                index
            }
            Err(err) => {
                error!("failed to fetch index {quarter}, error({err})");
                FilingIndex::new()
            }
        };

        self.quarters
            .lock()
            .await
            .entry(quarter)
            .or_insert_with(|| Arc::new(index))
            .clone()
    }

    /// Fetch several quarters ahead of time, 4 downloads at a time.
    pub async fn preload(&self, client: &SpiderClient, quarters: impl IntoIterator<Item = Quarter>) {
        let time = std::time::Instant::now();
        stream::iter(quarters)
            .for_each_concurrent(4, |quarter| async move {
                self.get(client, quarter).await;
            })
            .await;
        debug!("quarterly indexes preloaded. {}", crate::time_elapsed(time));
    }
}
