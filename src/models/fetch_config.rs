use crate::constants::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_PAGE_SIZE,
};
use crate::error::{AppError, Result};
use crate::utils::{env_bool_or, env_or};
use std::time::Duration;

/// Configuration for a paginated fetch run
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Items requested per page
    pub page_size: u32,

    /// Maximum simultaneous in-flight page requests
    pub concurrency: usize,

    /// Retries per page after the first attempt
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries
    pub base_delay: Duration,

    /// Reassemble items in page order instead of completion order
    pub keep_order: bool,

    /// Per-worker pause after each completed page (zero disables)
    pub throttle: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            keep_order: false,
            throttle: Duration::ZERO,
        }
    }
}

impl FetchConfig {
    /// Build config from `FETCH_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            page_size: env_or("FETCH_PAGE_SIZE", defaults.page_size),
            concurrency: env_or("FETCH_CONCURRENCY", defaults.concurrency),
            max_retries: env_or("FETCH_MAX_RETRIES", defaults.max_retries),
            base_delay: Duration::from_millis(env_or("FETCH_BASE_DELAY_MS", DEFAULT_BASE_DELAY_MS)),
            keep_order: env_bool_or("FETCH_KEEP_ORDER", defaults.keep_order),
            throttle: Duration::from_millis(env_or("FETCH_THROTTLE_MS", 0u64)),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    pub fn with_keep_order(mut self, keep_order: bool) -> Self {
        self.keep_order = keep_order;
        self
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Reject settings that would stall or silently truncate a fetch
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(AppError::Config("page_size must be at least 1".to_string()));
        }
        if self.concurrency == 0 {
            return Err(AppError::Config("concurrency must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Number of workers for a run over `total_pages` pages
    ///
    /// Page 1 is fetched up front, so never more workers than remaining
    /// pages, and at least one.
    pub fn worker_count(&self, total_pages: u32) -> usize {
        let remaining = total_pages.saturating_sub(1).max(1) as usize;
        self.concurrency.min(remaining)
    }
}
