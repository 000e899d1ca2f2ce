use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, RETRY_AFTER};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{DocidentError, Result};

/// Hard per-request timeout. Registry and search lookups must never hang the
/// pipeline; expiry surfaces as an error that validation treats as
/// "unconfirmed".
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct RateLimitedClient {
    client: reqwest::Client,
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
    max_retries: u32,
}

impl RateLimitedClient {
    pub fn new(min_interval: Duration, max_retries: u32, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
            max_retries,
        }
    }

    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(t) = *last {
            let elapsed = t.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub async fn get(&self, url: &str) -> Result<String> {
        self.get_with_headers(url, HeaderMap::new()).await
    }

    /// GET returning the response body. Non-2xx statuses become
    /// [`DocidentError::Api`] with the status embedded so callers can tell a
    /// definitive "not registered" from a transport problem.
    pub async fn get_with_headers(&self, url: &str, headers: HeaderMap) -> Result<String> {
        let (_, body) = self.get_with_status(url, headers).await?;
        Ok(body)
    }

    /// GET returning `(status, body)` for successful requests. 4xx responses
    /// are returned with their status rather than as errors.
    pub async fn get_with_status(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<(u16, String)> {
        let mut attempt = 0u32;
        loop {
            self.wait_for_rate_limit().await;
            let resp = self.client.get(url).headers(headers.clone()).send().await;
            match resp {
                Ok(r) if r.status() == 429 => {
                    if attempt >= self.max_retries {
                        return Err(DocidentError::RateLimit(url.to_string(), 60));
                    }
                    let wait = r
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    debug!(url, wait, "rate limited, backing off");
                    sleep(Duration::from_secs(wait)).await;
                    attempt += 1;
                }
                Ok(r) if r.status().is_server_error() => {
                    let status = r.status().as_u16();
                    let body = r.text().await.unwrap_or_default();
                    return Err(DocidentError::Api(
                        url.to_string(),
                        format!("HTTP {status}: {body}"),
                    ));
                }
                Ok(r) => {
                    let status = r.status().as_u16();
                    let body = r.text().await.map_err(DocidentError::Http)?;
                    return Ok((status, body));
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(DocidentError::Http(e));
                    }
                    let backoff = 2u64.pow(attempt);
                    debug!(url, backoff, "request failed, retrying");
                    sleep(Duration::from_secs(backoff)).await;
                    attempt += 1;
                }
            }
        }
    }
}
