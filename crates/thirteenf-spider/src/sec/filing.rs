use super::index::{pad_cik, IndexCache, IndexEntry, Quarter};
use crate::http::SpiderClient;
use chrono::{Days, NaiveDate};
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, trace};

/// A 13F must be filed within 45 days of quarter end; late filers and amendments stretch that,
/// so accept anything up to 150 days after the period.
pub const FILING_WINDOW_DAYS: u64 = 150;

/// Bytes of an XML document inspected when its name does not say what it is.
const SNIFF_BYTES: usize = 8192;

lazy_static::lazy_static! {
    static ref PRIMARY_DOC: Regex = Regex::new(r"(?i)primary.*doc").expect("valid regex");
    static ref INFO_TABLE: Regex = Regex::new(r"(?i)info.*table").expect("valid regex");
    static ref ANCHORS: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Pick the filing covering `period_end` from a manager's index entries.
///
/// Candidates are filed between the day after the period and [`FILING_WINDOW_DAYS`] later;
/// originals beat amendments, then the earliest filing wins.
pub fn select_filing<'a>(entries: &'a [IndexEntry], period_end: NaiveDate) -> Option<&'a IndexEntry> {
    let start = period_end + Days::new(1);
    let end = period_end + Days::new(FILING_WINDOW_DAYS);

    entries
        .iter()
        .filter(|entry| start <= entry.filing_date && entry.filing_date <= end)
        .min_by_key(|entry| (entry.is_amendment(), entry.filing_date))
}

/// Find the 13F a manager filed for `period_end`: first in the quarter after the period, then
/// in the one after that.
pub async fn find_13f_filing(
    cache: &IndexCache,
    client: &SpiderClient,
    cik: &str,
    period_end: NaiveDate,
) -> Option<IndexEntry> {
    let cik = pad_cik(cik);
    let first = Quarter::of(period_end).next();

    for quarter in [first, first.next()] {
        let index = cache.get(client, quarter).await;
        if let Some(entries) = index.get(&cik) {
            if let Some(entry) = select_filing(entries, period_end) {
                trace!("found {} {} for CIK{cik} in {quarter}", entry.form_type, entry.accession_no);
                return Some(entry.clone());
            }
        }
    }

    None
}

/// Archive directory of a filing.
pub fn directory_url(cik: &str, accession_no: &str) -> String {
    let cik = cik.trim_start_matches('0');
    format!("https://www.sec.gov/Archives/edgar/data/{cik}/{accession_no}")
}

/// The XML documents of a filing, as far as their names tell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilingLinks {
    pub xml_urls: Vec<String>,
    pub primary_doc: Option<String>,
    pub info_table: Option<String>,
}

/// Collect the `.xml` links of a filing directory listing, absolutized against
/// `directory_url`, and guess the cover page and information table from their names.
pub fn parse_filing_links(html: &str, directory_url: &str) -> FilingLinks {
    let document = Html::parse_document(html);

    let xml_urls: Vec<String> = document
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.to_ascii_lowercase().ends_with(".xml"))
        .map(|href| {
            if href.starts_with('/') {
                format!("https://www.sec.gov{href}")
            } else if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{directory_url}/{href}")
            }
        })
        .collect();

    let primary_doc = xml_urls.iter().find(|u| PRIMARY_DOC.is_match(u)).cloned();
    let info_table = xml_urls.iter().find(|u| INFO_TABLE.is_match(u)).cloned();

    FilingLinks {
        xml_urls,
        primary_doc,
        info_table,
    }
}

/// What the head of an XML document says it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    PrimaryDoc,
    InfoTable,
    Unknown,
}

/// Classify a document by the root elements found in its first 8 KiB.
pub fn sniff_document(content: &[u8]) -> DocumentKind {
    let head = &content[..content.len().min(SNIFF_BYTES)];
    let contains = |needle: &[u8]| head.windows(needle.len()).any(|w| w == needle);

    if contains(b"edgarSubmission") || contains(b"coverPage") {
        DocumentKind::PrimaryDoc
    } else if contains(b"informationTable") || contains(b"infoTable") {
        DocumentKind::InfoTable
    } else {
        DocumentKind::Unknown
    }
}

/// Locate the cover page and information table of a filing.
///
/// Filers name these documents freely; when the names give nothing away, each XML document is
/// fetched and sniffed until both are found.
pub async fn locate_documents(
    client: &SpiderClient,
    cik: &str,
    accession_no: &str,
) -> crate::error::Result<FilingLinks> {
    let dir = directory_url(cik, accession_no);
    let listing = client.get_text(&dir).await?;
    let mut links = parse_filing_links(&listing, &dir);

    if links.primary_doc.is_none() || links.info_table.is_none() {
        debug!("sniffing {} documents of {accession_no}", links.xml_urls.len());
        for url in links.xml_urls.clone() {
            if links.primary_doc.is_some() && links.info_table.is_some() {
                break;
            }
            let Ok(content) = client.get_head(&url, SNIFF_BYTES).await else {
                continue;
            };
            match sniff_document(&content) {
                DocumentKind::PrimaryDoc if links.primary_doc.is_none() => {
                    links.primary_doc = Some(url)
                }
                DocumentKind::InfoTable if links.info_table.is_none() => {
                    links.info_table = Some(url)
                }
                _ => {}
            }
        }
    }

    Ok(links)
}
