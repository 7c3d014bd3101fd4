use super::index::{IndexCache, Quarter};
use super::{process_filing, FilingOutcome, FilingTask};
use crate::holdings::UnitResolver;
use crate::http::SpiderClient;
use crate::tui::{step_spinner, Progress};
use deadpool_postgres::Pool;
use futures::{stream, StreamExt};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, error, info, warn};

/// Counts of how each task of a run ended.
#[derive(Debug, Default)]
pub struct Summary {
    pub success: usize,
    pub no_filing: usize,
    pub no_holdings: usize,
    pub errors: usize,
    /// Holdings rows written across all stored filings.
    pub rows: u64,
}

#[derive(Default)]
struct Counters {
    success: AtomicUsize,
    no_filing: AtomicUsize,
    no_holdings: AtomicUsize,
    errors: AtomicUsize,
    rows: AtomicU64,
}

impl Counters {
    fn into_summary(self) -> Summary {
        Summary {
            success: self.success.into_inner(),
            no_filing: self.no_filing.into_inner(),
            no_holdings: self.no_holdings.into_inner(),
            errors: self.errors.into_inner(),
            rows: self.rows.into_inner(),
        }
    }
}

/// Index quarters a set of tasks may need: the two after each period end.
pub fn quarters_needed(tasks: &[FilingTask]) -> BTreeSet<Quarter> {
    tasks
        .iter()
        .flat_map(|task| {
            let first = Quarter::of(task.period_end).next();
            [first, first.next()]
        })
        .collect()
}

/// Fetch, resolve and store the 13F of every task, `workers` at a time.
pub async fn scrape(
    pool: &Pool,
    client: &SpiderClient,
    resolver: &UnitResolver,
    tasks: Vec<FilingTask>,
    workers: usize,
    tui: bool,
) -> anyhow::Result<Summary> {
    let time = std::time::Instant::now();
    if tui {
        println!(
            "{bar}\n{name:^40}\n{bar}",
            bar = "=".repeat(40),
            name = "SEC 13F Holdings"
        )
    }

    crate::store::ensure_tables(pool).await.map_err(|err| {
        error!("failed to create holdings tables, error({err})");
        err
    })?;

    let cache = IndexCache::new();
    let quarters = quarters_needed(&tasks);
    info!("preloading {} quarterly indexes ...", quarters.len());
    let pb = step_spinner("loading quarterly indexes ...", tui);
    cache.preload(client, quarters).await;
    pb.finish_and_clear();
    if tui {
        println!("loading quarterly indexes ... done");
    }

    let progress = Progress::new(tasks.len(), tui)?;
    let counters = Counters::default();

    info!("processing {} filings with {workers} workers ...", tasks.len());
    stream::iter(tasks)
        .for_each_concurrent(workers.max(1), |task| {
            let cache = &cache;
            let counters = &counters;
            let progress = progress.clone();
            async move {
                let time = std::time::Instant::now();
                let label = format!("CIK{} {}", task.cik, task.period_end);
                let spinner = progress.spinner(format!("collecting 13F for {label}"));

                match process_filing(cache, client, resolver, task).await {
                    FilingOutcome::Success(filing) => {
                        spinner.set_message(format!("storing {} holdings for {label}", filing.holdings.len()));
                        match crate::store::replace_sec_filing(pool, &filing).await {
                            Ok(rows) => {
                                debug!(
                                    "{rows} holdings stored for {label} ({}), {}",
                                    filing.accession_no,
                                    crate::time_elapsed(time)
                                );
                                counters.success.fetch_add(1, Ordering::Relaxed);
                                counters.rows.fetch_add(rows, Ordering::Relaxed);
                                progress.succeed();
                            }
                            Err(err) => {
                                error!("failed to store holdings for {label}, error({err})");
                                counters.errors.fetch_add(1, Ordering::Relaxed);
                                progress.failed();
                            }
                        }
                    }
                    FilingOutcome::NoFiling => {
                        warn!("no 13F filing found for {label}");
                        counters.no_filing.fetch_add(1, Ordering::Relaxed);
                        progress.failed();
                    }
                    FilingOutcome::NoHoldings { accession_no } => {
                        warn!("no holdings parsed from {accession_no} for {label}");
                        counters.no_holdings.fetch_add(1, Ordering::Relaxed);
                        progress.failed();
                    }
                    FilingOutcome::Error(err) => {
                        error!("failed to collect 13F for {label}, error({err})");
                        counters.errors.fetch_add(1, Ordering::Relaxed);
                        progress.failed();
                    }
                }

                spinner.finish_and_clear();
            }
        })
        .await;

    progress.finish();

    let summary = counters.into_summary();
    info!(
        "13F run finished: {} stored ({} rows), {} without filing, {} without holdings, {} errors. {}",
        summary.success,
        summary.rows,
        summary.no_filing,
        summary.no_holdings,
        summary.errors,
        crate::time_elapsed(time)
    );
    if tui {
        println!("collecting 13F holdings ... done");
    }

    Ok(summary)
}
