use chrono::NaiveDate;
use thirteenf_spider::http::SpiderClient;
use thirteenf_spider::sec::filing::{find_13f_filing, select_filing};
use thirteenf_spider::sec::index::{parse_master_index, pad_cik, IndexCache, IndexEntry, Quarter};
use thirteenf_spider::sec::scrape::quarters_needed;
use thirteenf_spider::sec::FilingTask;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn entry(form_type: &str, filed: &str, accession_no: &str) -> IndexEntry {
    IndexEntry {
        form_type: form_type.to_string(),
        filing_date: date(filed),
        accession_no: accession_no.to_string(),
    }
}

const MASTER_IDX: &str = "\
Description:           Master Index of EDGAR Dissemination Feed
Last Data Received:    December 31, 2024
Comments:              webmaster@sec.gov

CIK|Company Name|Form Type|Date Filed|Filename
--------------------------------------------------------------------------------
1067983|BERKSHIRE HATHAWAY INC|13F-HR|2024-11-14|edgar/data/1067983/0000950123-24-011775.txt
1067983|BERKSHIRE HATHAWAY INC|13F-HR/A|2024-11-20|edgar/data/1067983/0000950123-24-011999.txt
102909|VANGUARD GROUP INC|13F-HR|2024-11-13|edgar/data/102909/0000102909-24-000321.txt
320193|Apple Inc.|10-Q|2024-11-01|edgar/data/320193/0000320193-24-000123.txt
1111111|BROKEN DATE LLC|13F-HR|14/11/2024|edgar/data/1111111/0001111111-24-000001.txt
2222222|TOO FEW FIELDS|13F-HR|2024-11-14
";

// -- MASTER INDEX --

#[test]
fn master_index_keeps_13f_forms() {
    let index = parse_master_index(MASTER_IDX);

    assert_eq!(index.len(), 2);
    assert_eq!(
        index["0001067983"],
        vec![
            entry("13F-HR", "2024-11-14", "000095012324011775"),
            entry("13F-HR/A", "2024-11-20", "000095012324011999"),
        ]
    );
    assert_eq!(index["0000102909"][0].accession_no, "000010290924000321");
    assert!(!index.contains_key("0000320193"));
    assert!(!index.contains_key("0001111111"));
}

#[test]
fn master_index_without_header_is_empty() {
    assert!(parse_master_index("1067983|BERKSHIRE|13F-HR|2024-11-14|a.txt").is_empty());
    assert!(parse_master_index("").is_empty());
}

#[test]
fn cik_padding() {
    assert_eq!(pad_cik("1067983"), "0001067983");
    assert_eq!(pad_cik(" 0001067983 "), "0001067983");
}

// -- QUARTERS --

#[test]
fn quarter_arithmetic() {
    let q = Quarter::of(date("2024-09-30"));
    assert_eq!(q, Quarter { year: 2024, quarter: 3 });
    assert_eq!(q.next(), Quarter { year: 2024, quarter: 4 });
    assert_eq!(q.next().next(), Quarter { year: 2025, quarter: 1 });
    assert_eq!(Quarter::of(date("2024-01-01")).quarter, 1);
    assert_eq!(Quarter::of(date("2024-12-31")).quarter, 4);
    assert_eq!(q.to_string(), "2024 Q3");
    assert_eq!(
        q.master_index_url(),
        "https://www.sec.gov/Archives/edgar/full-index/2024/QTR3/master.idx"
    );
}

#[test]
fn quarters_needed_for_tasks() {
    let tasks = vec![
        FilingTask { cik: "0000000001".into(), period_end: date("2024-09-30") },
        FilingTask { cik: "0000000002".into(), period_end: date("2024-12-31") },
    ];
    let quarters: Vec<Quarter> = quarters_needed(&tasks).into_iter().collect();
    assert_eq!(
        quarters,
        vec![
            Quarter { year: 2024, quarter: 4 },
            Quarter { year: 2025, quarter: 1 },
            Quarter { year: 2025, quarter: 2 },
        ]
    );
}

// -- FILING SELECTION --

#[test]
fn originals_beat_amendments() {
    let entries = vec![
        entry("13F-HR/A", "2024-10-15", "amended"),
        entry("13F-HR", "2024-11-14", "original"),
    ];
    let picked = select_filing(&entries, date("2024-09-30")).unwrap();
    assert_eq!(picked.accession_no, "original");
}

#[test]
fn earliest_filing_wins() {
    let entries = vec![
        entry("13F-HR", "2024-11-14", "later"),
        entry("13F-HR", "2024-11-01", "earlier"),
    ];
    assert_eq!(
        select_filing(&entries, date("2024-09-30")).unwrap().accession_no,
        "earlier"
    );
}

#[test]
fn filings_outside_the_window_are_ignored() {
    let entries = vec![
        entry("13F-HR", "2024-09-30", "same day"),
        entry("13F-HR", "2025-02-28", "151 days"),
    ];
    assert!(select_filing(&entries, date("2024-09-30")).is_none());

    let entries = vec![
        entry("13F-HR", "2024-10-01", "day after"),
        entry("13F-HR/A", "2025-02-27", "150 days"),
    ];
    assert_eq!(
        select_filing(&entries[1..], date("2024-09-30")).unwrap().accession_no,
        "150 days"
    );
    assert_eq!(
        select_filing(&entries, date("2024-09-30")).unwrap().accession_no,
        "day after"
    );
}

// -- CACHE --

#[tokio::test]
async fn cache_serves_seeded_quarters() {
    let cache = IndexCache::new();
    assert!(cache.is_empty().await);

    let q4 = Quarter { year: 2024, quarter: 4 };
    cache.insert(q4, parse_master_index(MASTER_IDX)).await;
    assert_eq!(cache.len().await, 1);

    let client = SpiderClient::sec("thirteenf tests test@example.com").unwrap();
    let index = cache.get(&client, q4).await;
    assert_eq!(index.len(), 2);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn filing_found_in_either_following_quarter() {
    let cache = IndexCache::new();
    let client = SpiderClient::sec("thirteenf tests test@example.com").unwrap();

    cache
        .insert(Quarter { year: 2024, quarter: 4 }, parse_master_index(MASTER_IDX))
        .await;
    let mut late = thirteenf_spider::sec::index::FilingIndex::new();
    late.insert(
        "0000055555".to_string(),
        vec![entry("13F-HR", "2025-01-20", "000005555525000001")],
    );
    cache.insert(Quarter { year: 2025, quarter: 1 }, late).await;

    let found = find_13f_filing(&cache, &client, "1067983", date("2024-09-30"))
        .await
        .unwrap();
    assert_eq!(found.accession_no, "000095012324011775");

    let found = find_13f_filing(&cache, &client, "55555", date("2024-09-30"))
        .await
        .unwrap();
    assert_eq!(found.accession_no, "000005555525000001");

    assert!(find_13f_filing(&cache, &client, "999", date("2024-09-30"))
        .await
        .is_none());
}
