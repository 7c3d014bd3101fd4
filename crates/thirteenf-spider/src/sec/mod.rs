use crate::holdings::{units, HoldingRecord, ResolvedHolding, UnitMultiplier, UnitResolver};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use document::{EntryDetail, InfoTableEntry, MAX_INFO_TABLE_BYTES};
use index::IndexCache;
use tracing::{debug, trace, warn};

/// Quarterly `master.idx` files: which manager filed which 13F, and when.
pub mod index;

/// Picking a manager's filing for a period, and locating its documents.
pub mod filing;

/// Cover-page totals and information tables.
pub mod document;

/// Concurrent EDGAR run over a list of (CIK, period end) pairs.
pub mod scrape;

/// One (manager, period) to fetch from EDGAR.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilingTask {
    /// 10-digit, zero-padded.
    pub cik: String,
    pub period_end: NaiveDate,
}

/// A fetched and resolved 13F, ready to be stored.
#[derive(Clone, Debug)]
pub struct SecFiling {
    pub task: FilingTask,
    pub accession_no: String,
    /// Cover-page total in the filer's units.
    pub total_value: Option<BigDecimal>,
    pub multiplier: UnitMultiplier,
    pub holdings: Vec<(EntryDetail, ResolvedHolding)>,
}

impl SecFiling {
    /// Cover-page total scaled like the holdings.
    pub fn total_value_usd(&self) -> Option<BigDecimal> {
        self.total_value.as_ref().map(|total| self.multiplier.apply(total))
    }
}

/// How processing one task ended.
#[derive(Debug)]
pub enum FilingOutcome {
    Success(SecFiling),
    NoFiling,
    NoHoldings { accession_no: String },
    Error(crate::error::SpiderError),
}

/// Resolve the unit scale of a parsed information table against its cover-page total.
pub fn resolve_entries(
    resolver: &UnitResolver,
    entries: Vec<InfoTableEntry>,
    total_value: Option<&BigDecimal>,
) -> (UnitMultiplier, Vec<(EntryDetail, ResolvedHolding)>) {
    let (records, details): (Vec<HoldingRecord>, Vec<EntryDetail>) = entries
        .into_iter()
        .map(|entry| (entry.record, entry.detail))
        .unzip();

    let multiplier = resolver.multiplier(&records, total_value);
    let holdings = details
        .into_iter()
        .zip(units::apply(records, multiplier))
        .collect();

    (multiplier, holdings)
}

/// Fetch, parse and resolve the 13F of one task.
///
/// Failures are folded into the outcome; nothing here aborts a run.
pub async fn process_filing(
    cache: &IndexCache,
    client: &crate::http::SpiderClient,
    resolver: &UnitResolver,
    task: FilingTask,
) -> FilingOutcome {
    let Some(entry) = filing::find_13f_filing(cache, client, &task.cik, task.period_end).await else {
        return FilingOutcome::NoFiling;
    };
    let accession_no = entry.accession_no;

    let links = match filing::locate_documents(client, &task.cik, &accession_no).await {
        Ok(links) => links,
        Err(err) => return FilingOutcome::Error(err),
    };

    // total first; the unit decision depends on it
    let mut total_value = None;
    if let Some(url) = &links.primary_doc {
        match client.get_text(url).await {
            Ok(xml) => total_value = document::parse_value_total(&xml),
            Err(err) => warn!("failed to fetch cover page of {accession_no}, error({err})"),
        }
    }

    let mut entries = vec![];
    if let Some(url) = &links.info_table {
        match client.get_bytes(url, Some(MAX_INFO_TABLE_BYTES)).await {
            Ok(bytes) => entries = document::parse_info_table(&String::from_utf8_lossy(&bytes)),
            Err(err) => warn!("failed to fetch info table of {accession_no}, error({err})"),
        }
    }
    trace!("{} info table entries in {accession_no}", entries.len());

    if entries.is_empty() {
        return FilingOutcome::NoHoldings { accession_no };
    }

    let (multiplier, holdings) = resolve_entries(resolver, entries, total_value.as_ref());
    debug!(
        "CIK{} {}: {} holdings {multiplier}",
        task.cik,
        task.period_end,
        holdings.len()
    );

    FilingOutcome::Success(SecFiling {
        task,
        accession_no,
        total_value,
        multiplier,
        holdings,
    })
}
