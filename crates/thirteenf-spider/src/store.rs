use crate::error::Result;
use crate::holdings::ResolvedHolding;
use crate::info13f::FilingRef;
use crate::sec::SecFiling;
use crate::sql;
use bigdecimal::BigDecimal;
use deadpool_postgres::Pool;
use tracing::{debug, info, trace};

/// Rows per transaction when loading 13f.info holdings.
pub const INFO13F_BATCH_SIZE: usize = 5000;

/// How a 13f.info load treats rows already stored for the same filing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Delete the filing's rows before inserting.
    #[default]
    Replace,
    Append,
}

fn decimal_text(value: &Option<BigDecimal>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

/// Create the holdings tables if they do not exist yet.
pub async fn ensure_tables(pool: &Pool) -> Result<()> {
    let pg_client = pool.get().await?;
    for statement in [
        sql::CREATE_MANAGER_QUARTER,
        sql::CREATE_MANAGER_QUARTER_HOLDING,
        sql::CREATE_EXPECTED_13FINFO_HOLDINGS,
    ] {
        pg_client.batch_execute(statement).await?;
    }
    debug!("holdings tables ensured");
    Ok(())
}

/// Store an EDGAR filing, replacing whatever was stored for its (CIK, period end).
///
/// Everything happens in one transaction: the cover-page total, the holdings, and the holding
/// count either all change or none do.
pub async fn replace_sec_filing(pool: &Pool, filing: &SecFiling) -> Result<u64> {
    let cik = &filing.task.cik;
    let period_end = &filing.task.period_end;
    let multiplier = filing.multiplier.factor() as i32;

    let mut pg_client = pool.get().await?;
    let transaction = pg_client.transaction().await?;

    if let Some(total_usd) = filing.total_value_usd() {
        transaction
            .execute(
                sql::UPDATE_TOTAL_VALUE,
                &[&total_usd.to_string(), cik, period_end],
            )
            .await?;
    }

    let deleted = transaction
        .execute(sql::DELETE_MANAGER_QUARTER_HOLDINGS, &[cik, period_end])
        .await?;
    trace!("deleted {deleted} stale holdings for CIK{cik} {period_end}");

    let insert = transaction
        .prepare(sql::INSERT_MANAGER_QUARTER_HOLDING)
        .await?;
    let mut inserted = 0;
    for (detail, holding) in &filing.holdings {
        let record = &holding.record;
        inserted += transaction
            .execute(
                &insert,
                &[
                    cik,
                    period_end,
                    &filing.accession_no,
                    &detail.line_no,
                    &record.issuer_name,
                    &record.security_class,
                    &record.cusip,
                    &decimal_text(&holding.value_usd),
                    &decimal_text(&record.shares),
                    &record.share_type,
                    &record.option_type,
                    &detail.investment_discretion,
                    &detail.other_manager,
                    &detail.voting_sole,
                    &detail.voting_shared,
                    &detail.voting_none,
                    &multiplier,
                ],
            )
            .await?;
    }

    let num_holdings = filing.holdings.len() as i32;
    transaction
        .execute(sql::UPDATE_NUM_HOLDINGS, &[&num_holdings, cik, period_end])
        .await?;

    transaction.commit().await?;
    Ok(inserted)
}

/// Load resolved 13f.info holdings into `expected_13finfo_holdings`, [`INFO13F_BATCH_SIZE`]
/// rows per transaction.
///
/// In [`WriteMode::Replace`] the filing's previous rows are deleted in the first transaction.
pub async fn insert_info13f(
    pool: &Pool,
    filing: &FilingRef,
    holdings: &[ResolvedHolding],
    mode: WriteMode,
) -> Result<u64> {
    let mut pg_client = pool.get().await?;

    if mode == WriteMode::Replace {
        let deleted = pg_client
            .execute(sql::DELETE_13FINFO_FILING, &[&filing.filing_url])
            .await?;
        info!("deleted {deleted} previous rows of {}", filing.filing_url);
    }

    let manager_url = filing.manager_url();
    let mut inserted = 0;
    for batch in holdings.chunks(INFO13F_BATCH_SIZE) {
        let transaction = pg_client.transaction().await?;
        let insert = transaction.prepare(sql::INSERT_13FINFO_HOLDING).await?;

        for holding in batch {
            let record = &holding.record;
            let multiplier = holding.unit_multiplier.factor() as i32;
            inserted += transaction
                .execute(
                    &insert,
                    &[
                        &manager_url,
                        &filing.cik,
                        &filing.quarter,
                        &filing.filing_url,
                        &record.symbol,
                        &record.issuer_name,
                        &record.security_class,
                        &record.cusip,
                        &decimal_text(&record.reported_value),
                        &decimal_text(&record.percent_of_portfolio),
                        &decimal_text(&record.shares),
                        &record.share_type,
                        &record.option_type,
                        &decimal_text(&holding.value_usd),
                        &multiplier,
                    ],
                )
                .await?;
        }

        transaction.commit().await?;
        trace!("committed batch of {} rows", batch.len());
    }

    Ok(inserted)
}
