use crate::error::{Result, SpiderError};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{trace, warn};

pub use reqwest::Client as HttpClient;

/// SEC fair-access limit is 10 requests per second; stay just under it.
pub const SEC_REQUEST_INTERVAL: Duration = Duration::from_millis(110);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// When and how often a failed request is tried again.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the first retry; doubled on each further retry.
    pub backoff: Duration,
    pub statuses: Vec<StatusCode>,
}

impl RetryPolicy {
    /// EDGAR answers throttled clients with 403 as well as 429.
    pub fn sec() -> Self {
        Self {
            max_attempts: 8,
            backoff: Duration::from_secs(1),
            statuses: vec![
                StatusCode::FORBIDDEN,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }

    pub fn info13f() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(600),
            statuses: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff * 2u32.saturating_pow(attempt)
    }
}

/// A [`reqwest::Client`] shared by every task of a run, spacing requests at least `interval`
/// apart and retrying throttled or failed ones.
#[derive(Debug)]
pub struct SpiderClient {
    http: HttpClient,
    interval: Duration,
    retry: RetryPolicy,
    last_request: Mutex<Option<Instant>>,
}

impl SpiderClient {
    pub fn new(
        user_agent: &str,
        interval: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            interval,
            retry,
            last_request: Mutex::new(None),
        })
    }

    /// Client for `www.sec.gov`, rate limited to ~9 requests per second.
    pub fn sec(user_agent: &str) -> Result<Self> {
        Self::new(user_agent, SEC_REQUEST_INTERVAL, RetryPolicy::sec())
    }

    /// Client for the 13f.info API.
    pub fn info13f(user_agent: &str) -> Result<Self> {
        Self::new(user_agent, Duration::from_millis(50), RetryPolicy::info13f())
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url).await?.text().await?)
    }

    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let bytes = self.get(url).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET a document, refusing anything that advertises or streams more than `max_bytes`.
    pub async fn get_bytes(&self, url: &str, max_bytes: Option<u64>) -> Result<Vec<u8>> {
        let mut response = self.get(url).await?;
        let too_large = |bytes| SpiderError::TooLarge {
            url: url.to_string(),
            bytes,
        };

        if let (Some(bytes), Some(max)) = (response.content_length(), max_bytes) {
            if bytes > max {
                return Err(too_large(bytes));
            }
        }

        // chunked responses carry no length, so count as we go
        let mut body = vec![];
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if let Some(max) = max_bytes {
                if body.len() as u64 > max {
                    return Err(too_large(body.len() as u64));
                }
            }
        }
        Ok(body)
    }

    /// GET only the first `limit` bytes of a document; the rest of the body is never read.
    pub async fn get_head(&self, url: &str, limit: usize) -> Result<Vec<u8>> {
        let mut response = self.get(url).await?;

        let mut head = Vec::with_capacity(limit.min(64 * 1024));
        while head.len() < limit {
            let Some(chunk) = response.chunk().await? else {
                break;
            };
            head.extend_from_slice(&chunk);
        }
        head.truncate(limit);
        Ok(head)
    }

    /// GET with rate limiting and retries; any final non-success status is an error.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let mut attempt = 0;
        loop {
            self.wait_turn().await;
            trace!("http GET requesting {url} (attempt {})", attempt + 1);

            let last = attempt + 1 >= self.retry.max_attempts;
            match self.http.get(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    if last || !self.retry.statuses.contains(&status) {
                        return Err(SpiderError::Status {
                            status,
                            url: url.to_string(),
                        });
                    }
                    warn!("GET {url} returned {status}, retrying");
                }
                Err(err) => {
                    if last {
                        return Err(err.into());
                    }
                    warn!("GET {url} failed, retrying, error({err})");
                }
            }

            tokio::time::sleep(self.retry.delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Hold the caller until `interval` has passed since the previous request of any task.
    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
