use crate::constants::sim::PAGE_ROUTE;
use crate::error::{AppError, Result};
use crate::models::Page;
use crate::services::PagedSource;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Paged source backed by a remote coinperf-compatible HTTP endpoint
///
/// Requests `GET {base_url}/sim/coins?page={page}&size={size}` and decodes
/// the page JSON. Transient failures surface as errors and are retried by
/// the fetcher.
pub struct HttpPagedSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPagedSource {
    /// Create a new HTTP source
    ///
    /// # Arguments
    /// * `base_url` - Server root (e.g., "http://localhost:8080")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "Invalid base_url: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %base_url, "Created HTTP paged source");

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_url(&self, page: u32, size: u32) -> String {
        format!("{}{}?page={}&size={}", self.base_url, PAGE_ROUTE, page, size)
    }
}

#[async_trait]
impl PagedSource for HttpPagedSource {
    async fn get_page(&self, page: u32, size: u32) -> Result<Page> {
        let url = self.page_url(page, size);
        debug!(url = %url, "Requesting page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::PageFetch {
                page,
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::PageFetch {
                page,
                message: format!("server returned {}: {}", status, body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str::<Page>(&body)
            .map_err(|e| AppError::Parse(format!("Failed to parse page {}: {}", page, e)))
    }
}
