//! HTTP client for downloading resources

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::HttpSettings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("HTTP {0}")]
    Status(u16),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Fetcher boundary used by the fulfillment worker
///
/// Any non-2xx response or transport failure is an `Err`; the body of a
/// successful response is read as text.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher. Single attempt per task, no retry; a failed fetch
/// is recorded on the task instead.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .user_agent(&settings.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url, "Starting download");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else if e.is_redirect() {
                FetchError::TooManyRedirects
            } else {
                FetchError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("Failed to read body: {}", e)))?;

        debug!(url, size = body.len(), "Download completed");

        Ok(body)
    }
}
