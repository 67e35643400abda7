//! Page fetching: the trait the crawler consumes and its HTTP implementation.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::LAST_MODIFIED;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{Result, ScraperError};
use crate::html::Page;

/// User agent string identifying this scraper.
const USER_AGENT: &str = concat!("igedd-scraper/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Source of pages and document metadata.
pub trait PageFetcher {
    /// Fetch and parse an HTML page.
    fn fetch_page(&self, url: &str) -> Result<Page>;

    /// Issue a metadata-only request and return the raw Last-Modified header.
    fn fetch_last_modified(&self, url: &str) -> Result<String>;
}

/// [`PageFetcher`] backed by a blocking HTTP client.
pub struct HttpFetcher {
    client: Client,
    retry_base_delay: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout and user agent.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            retry_base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        })
    }

    /// Override the base backoff delay.
    #[must_use]
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Send a request with retry logic.
    ///
    /// Uses exponential backoff for transient failures (connection errors,
    /// timeouts, 5xx responses). Client errors are returned immediately.
    fn send_with_retry(&self, build: impl Fn(&Client) -> RequestBuilder) -> Result<Response> {
        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_base_delay * (1 << (attempt - 1));
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after delay");
                thread::sleep(delay);
            }

            match build(&self.client).send() {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() {
                        tracing::warn!(
                            status = %status,
                            attempt = attempt + 1,
                            max_retries = MAX_RETRIES,
                            "Server error, will retry"
                        );
                        last_error = Some(format!("Server error: {status}"));
                        continue;
                    }

                    return Ok(response.error_for_status()?);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        tracing::warn!(
                            error = %e,
                            attempt = attempt + 1,
                            max_retries = MAX_RETRIES,
                            "Connection error, will retry"
                        );
                        last_error = Some(e.to_string());
                        continue;
                    }
                    return Err(ScraperError::Http(e));
                }
            }
        }

        Err(ScraperError::RetriesExhausted {
            attempts: MAX_RETRIES,
            message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch_page(&self, url: &str) -> Result<Page> {
        let response = self.send_with_retry(|client| client.get(url))?;
        let body = response.text()?;
        Page::parse(url, &body)
    }

    fn fetch_last_modified(&self, url: &str) -> Result<String> {
        let response = self.send_with_retry(|client| client.head(url))?;
        response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ScraperError::MissingHeader {
                url: url.to_string(),
                header: "Last-Modified".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_fetcher() {
        assert!(HttpFetcher::new().is_ok());
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("igedd-scraper/"));
    }
}
