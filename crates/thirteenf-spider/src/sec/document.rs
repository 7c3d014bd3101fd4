use crate::holdings::normalize::clean_text;
use crate::holdings::{normalize_row, HoldingRecord};
use bigdecimal::BigDecimal;
use scraper::{ElementRef, Html};
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::trace;

/// Information tables above this size are skipped.
pub const MAX_INFO_TABLE_BYTES: u64 = 25_000_000;

/// Cover-page elements carrying the filing's aggregate value, in order of preference.
const TOTAL_TAGS: [&str; 3] = ["tablevaluetotal", "valuetotal", "securitiesownedaggregatevalue"];

/// Information-table fields handed to the holdings normalizer.
const ROW_TAGS: [&str; 7] = [
    "nameofissuer",
    "titleofclass",
    "cusip",
    "value",
    "sshprnamt",
    "sshprnamttype",
    "putcall",
];

/// One `<infoTable>` of an EDGAR information table.
#[derive(Clone, Debug, PartialEq)]
pub struct InfoTableEntry {
    pub record: HoldingRecord,
    pub detail: EntryDetail,
}

/// The EDGAR-only columns of an information-table entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryDetail {
    /// 1-based position among the document's `<infoTable>` elements.
    pub line_no: i32,
    pub investment_discretion: Option<String>,
    pub other_manager: Option<String>,
    pub voting_sole: Option<i64>,
    pub voting_shared: Option<i64>,
    pub voting_none: Option<i64>,
}

/// Lowercased element name with any namespace prefix (`ns1:`) removed.
fn local_name(el: &ElementRef) -> String {
    let name = el.value().name();
    name.rsplit(':').next().unwrap_or(name).to_ascii_lowercase()
}

/// Text directly inside an element.
///
/// Self-closing tags such as `<otherManager/>` are parsed as open elements that swallow their
/// following siblings, so descendant text is deliberately left out.
fn own_text(el: &ElementRef) -> Option<String> {
    let text: String = el
        .children()
        .filter_map(|child| child.value().as_text().map(|t| t.to_string()))
        .collect();
    clean_text(&Value::String(text))
}

fn elements<'a>(root: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    root.descendants().filter_map(ElementRef::wrap)
}

/// First descendant named `tag` with some text of its own.
fn find_text(root: ElementRef, tag: &str) -> Option<String> {
    elements(root)
        .filter(|el| local_name(el) == tag)
        .find_map(|el| own_text(&el))
}

fn find_int(root: ElementRef, tag: &str) -> Option<i64> {
    find_text(root, tag).and_then(|t| i64::from_str(&t.replace(',', "")).ok())
}

/// The aggregate value printed on a 13F cover page (`primary_doc.xml`), in the filer's units.
///
/// ```rust
/// use bigdecimal::BigDecimal;
/// use thirteenf_spider::sec::document::parse_value_total;
///
/// let xml = "<edgarSubmission><summaryPage><tableValueTotal>123456</tableValueTotal></summaryPage></edgarSubmission>";
/// assert_eq!(parse_value_total(xml), Some(BigDecimal::from(123456)));
/// ```
pub fn parse_value_total(xml: &str) -> Option<BigDecimal> {
    let document = Html::parse_document(xml);
    let root = document.root_element();

    TOTAL_TAGS.iter().find_map(|tag| {
        let el = elements(root).find(|el| local_name(el) == *tag)?;
        let text = own_text(&el)?;
        i64::from_str(&text).ok().map(BigDecimal::from)
    })
}

/// Every holding of an information table (`infotable.xml`), values left in source units.
///
/// Each `<infoTable>` goes through the same normalizer as 13f.info rows; entries without an
/// issuer name or CUSIP are dropped but still count towards `line_no`.
pub fn parse_info_table(xml: &str) -> Vec<InfoTableEntry> {
    let document = Html::parse_document(xml);

    elements(document.root_element())
        .filter(|el| local_name(el) == "infotable")
        .enumerate()
        .filter_map(|(idx, el)| {
            let row: Map<String, Value> = ROW_TAGS
                .iter()
                .filter_map(|tag| find_text(el, tag).map(|t| (tag.to_string(), Value::String(t))))
                .collect();

            let Some(record) = normalize_row(&Value::Object(row)) else {
                trace!("dropping info table entry {} without issuer or cusip", idx + 1);
                return None;
            };

            let voting = elements(el).find(|v| local_name(v) == "votingauthority");
            let vote = |tag: &str| voting.and_then(|v| find_int(v, tag));

            Some(InfoTableEntry {
                record,
                detail: EntryDetail {
                    line_no: idx as i32 + 1,
                    investment_discretion: find_text(el, "investmentdiscretion"),
                    other_manager: find_text(el, "othermanager"),
                    voting_sole: vote("sole"),
                    voting_shared: vote("shared"),
                    voting_none: vote("none"),
                },
            })
        })
        .collect()
}
