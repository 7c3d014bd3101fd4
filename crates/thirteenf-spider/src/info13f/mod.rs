use crate::error::{Result, SpiderError};
use crate::holdings::{process_payload, ResolvedHolding, UnitResolver};
use crate::http::SpiderClient;
use bigdecimal::BigDecimal;
use regex::Regex;
use reqwest::Url;
use tracing::{debug, info};

pub const BASE_URL: &str = "https://13f.info";

lazy_static::lazy_static! {
    static ref FILING_SLUG: Regex = Regex::new(
        r"(?i)^(?P<fid>\d{18})-.*-(?P<q>q[1-4])-(?P<y>\d{4})(?:-new-holdings)?$"
    )
    .expect("valid regex");
}

/// A filing page of 13f.info, e.g.
/// `https://13f.info/13f/000091957414001804-kingdon-capital-management-l-l-c-q4-2013`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilingRef {
    pub filing_url: String,
    /// 18 digits; the first 10 are the filer's zero-padded CIK.
    pub filing_id: String,
    /// CIK without leading zeros.
    pub cik: String,
    /// `Q4 2013`.
    pub quarter: String,
}

impl FilingRef {
    /// JSON endpoint serving the filing's holdings.
    pub fn api_url(&self) -> String {
        format!("{BASE_URL}/data/13f/{}", self.filing_id)
    }

    pub fn manager_url(&self) -> String {
        format!("{BASE_URL}/manager/{}", &self.filing_id[..10])
    }
}

/// Parse a 13f.info filing URL.
///
/// ```rust
/// use thirteenf_spider::info13f::parse_filing_url;
///
/// let filing = parse_filing_url(
///     "https://13f.info/13f/000091957414001804-kingdon-capital-management-l-l-c-q4-2013",
/// )
/// .unwrap();
/// assert_eq!(filing.filing_id, "000091957414001804");
/// assert_eq!(filing.cik, "919574");
/// assert_eq!(filing.quarter, "Q4 2013");
/// ```
pub fn parse_filing_url(filing_url: &str) -> Result<FilingRef> {
    let invalid = || SpiderError::FilingUrl(filing_url.to_string());

    let url = Url::parse(filing_url).map_err(|_| invalid())?;
    let path = url.path().trim_matches('/');
    let slug = path.strip_prefix("13f/").ok_or_else(invalid)?;
    let caps = FILING_SLUG.captures(slug).ok_or_else(invalid)?;

    let filing_id = caps["fid"].to_string();
    let cik = match filing_id[..10].trim_start_matches('0') {
        "" => "0".to_string(),
        cik => cik.to_string(),
    };
    let quarter = format!("{} {}", caps["q"].to_ascii_uppercase(), &caps["y"]);

    Ok(FilingRef {
        filing_url: filing_url.to_string(),
        filing_id,
        cik,
        quarter,
    })
}

/// Fetch a filing's holdings from the 13f.info API and resolve their unit scale.
pub async fn fetch_holdings(
    client: &SpiderClient,
    filing: &FilingRef,
    reported_total_value: Option<BigDecimal>,
    resolver: &UnitResolver,
) -> Result<Vec<ResolvedHolding>> {
    let time = std::time::Instant::now();
    let api_url = filing.api_url();

    debug!("fetching {api_url}");
    let payload = client.get_json(&api_url).await?;
    let holdings = process_payload(&payload, reported_total_value, resolver);

    info!(
        "{} holdings for CIK{} {} parsed. {}",
        holdings.len(),
        filing.cik,
        filing.quarter,
        crate::time_elapsed(time)
    );
    Ok(holdings)
}
