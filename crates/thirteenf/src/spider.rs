use crate::cli::Mode;
use bigdecimal::BigDecimal;
use deadpool_postgres::{ManagerConfig, Pool, RecyclingMethod};
use dotenv::var;
use std::path::Path;
use thirteenf_spider::holdings::{process_payload, UnitResolver};
use thirteenf_spider::http::SpiderClient;
use thirteenf_spider::store::{self, WriteMode};
use thirteenf_spider::{fs, info13f, sec};
use tracing::{debug, error, info, trace, warn};

/// SEC asks automated clients to identify themselves with a contact address.
const DEFAULT_USER_AGENT: &str = "thirteenf holdings research admin@example.com";

fn user_agent() -> String {
    var("USER_AGENT").unwrap_or_else(|_| {
        warn!("USER_AGENT not set, using the default contact string");
        DEFAULT_USER_AGENT.to_string()
    })
}

/// Connection pool to the holdings database at `DATABASE_URL`.
fn pg_pool() -> anyhow::Result<Pool> {
    trace!("creating postgres connection pool config");
    let mut pg_config = deadpool_postgres::Config::new();
    pg_config.url = Some(var("DATABASE_URL")?);
    pg_config.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    trace!("creating holdings connection pool");
    let pool = pg_config.create_pool(
        Some(deadpool_postgres::Runtime::Tokio1),
        tokio_postgres::NoTls,
    )?;
    debug!("holdings connection pool established");
    Ok(pool)
}

fn path_str(path: &Path) -> anyhow::Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow::anyhow!("path is not valid UTF-8: {}", path.display()))
}

/// `thirteenf sec`: collect the EDGAR 13F of every row of a CSV file.
pub(crate) async fn run_sec(
    csv: &Path,
    workers: usize,
    resolver: &UnitResolver,
    tui: bool,
) -> anyhow::Result<()> {
    let tasks = fs::read_filing_tasks(path_str(csv)?).await.map_err(|err| {
        error!("failed to read filing tasks from {}, error({err})", csv.display());
        err
    })?;
    info!("{} filing tasks read from {}", tasks.len(), csv.display());
    if tasks.is_empty() {
        return Ok(());
    }

    let pool = pg_pool()?;
    let client = SpiderClient::sec(&user_agent())?;
    let summary = sec::scrape::scrape(&pool, &client, resolver, tasks, workers, tui).await?;

    if tui {
        println!(
            "stored: {}, no filing: {}, no holdings: {}, errors: {}",
            summary.success, summary.no_filing, summary.no_holdings, summary.errors
        );
    }
    Ok(())
}

/// `thirteenf info`: collect one 13f.info filing.
pub(crate) async fn run_info(
    filing_url: &str,
    mode: Mode,
    dry_run: bool,
    reported_total: Option<BigDecimal>,
    resolver: &UnitResolver,
) -> anyhow::Result<()> {
    let filing = info13f::parse_filing_url(filing_url)?;
    debug!("parsed {filing:?}");

    let client = SpiderClient::info13f(&user_agent())?;
    let holdings = info13f::fetch_holdings(&client, &filing, reported_total, resolver).await?;

    println!("filing url  : {}", filing.filing_url);
    println!("api url     : {}", filing.api_url());
    println!("cik         : {}", filing.cik);
    println!("quarter     : {}", filing.quarter);
    println!("rows parsed : {}", holdings.len());

    if dry_run {
        for holding in holdings.iter().take(10) {
            println!("{}", serde_json::to_string(holding)?);
        }
        return Ok(());
    }

    if holdings.is_empty() {
        warn!("no holdings parsed from {filing_url}, nothing to insert");
        return Ok(());
    }

    let mode = match mode {
        Mode::Replace => WriteMode::Replace,
        Mode::Append => WriteMode::Append,
    };
    let pool = pg_pool()?;
    store::ensure_tables(&pool).await?;
    let rows = store::insert_info13f(&pool, &filing, &holdings, mode).await?;
    info!("{rows} rows inserted for {}", filing.filing_url);
    Ok(())
}

/// `thirteenf resolve`: run a local payload through the holdings pipeline and print the result.
pub(crate) async fn run_resolve(
    file: &Path,
    reported_total: Option<BigDecimal>,
    resolver: &UnitResolver,
) -> anyhow::Result<()> {
    let payload: serde_json::Value = fs::read_json(path_str(file)?).await?;
    let holdings = process_payload(&payload, reported_total, resolver);
    info!("{} holdings resolved from {}", holdings.len(), file.display());

    println!("{}", serde_json::to_string_pretty(&holdings)?);
    Ok(())
}
