use thiserror::Error;

/// Failures of the fetch and storage layers.
///
/// The holdings core never fails; everything here is I/O or malformed input at the edges.
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("http request failed, error({0})")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("document at {url} is too large ({bytes} bytes)")]
    TooLarge { url: String, bytes: u64 },

    #[error("failed to read file, error({0})")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON, error({0})")]
    Json(#[from] serde_json::Error),

    #[error("not a 13f.info filing url: {0}")]
    FilingUrl(String),

    #[error("invalid period end {0:?}")]
    PeriodEnd(String),

    #[error("failed to read csv input, error({0})")]
    Csv(#[from] csv::Error),

    #[error("postgres error({0})")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("failed to get pg client from pool, error({0})")]
    Pool(#[from] deadpool_postgres::PoolError),
}

pub type Result<T> = std::result::Result<T, SpiderError>;
