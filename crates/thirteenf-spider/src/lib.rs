//! Collects 13F holdings from SEC EDGAR and 13f.info, normalizes them into one record shape,
//! and resolves each filing's value scale to US dollars before storing it in Postgres.

pub mod error;
pub mod fs;
pub mod holdings;
pub mod http;
pub mod info13f;
pub mod sec;
pub mod store;

pub(crate) mod sql;
pub(crate) mod tui;

pub use error::{Result, SpiderError};

/// Time since `time`, formatted for log lines.
pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    let elapsed = time.elapsed();
    match elapsed.as_secs() {
        0 => format!("[Time: {}ms]", elapsed.as_millis()),
        secs if secs < 60 => format!("[Time: {:.2}s]", elapsed.as_secs_f64()),
        secs => format!("[Time: {}m {}s]", secs / 60, secs % 60),
    }
}
