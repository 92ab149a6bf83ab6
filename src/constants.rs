//! Fetch and Summary Constants
//!
//! Defaults shared by the paginated fetcher, the simulated source and the
//! Top-N aggregator.
//!
//! ## Fetch defaults
//!
//! - 100 items per page, 8 concurrent workers
//! - 2 retries per page with 120ms base backoff
//! - Retry jitter is drawn from `[0, 50)` ms regardless of the base delay

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default number of concurrent page workers
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default retries per page (total attempts = retries + 1)
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default base delay for exponential backoff (milliseconds)
pub const DEFAULT_BASE_DELAY_MS: u64 = 120;

/// Upper bound (exclusive) of the uniform retry jitter (milliseconds)
pub const RETRY_JITTER_MAX_MS: f64 = 50.0;

/// Simulated source settings
pub mod sim {
    /// Number of records in the simulated dataset
    pub const TOTAL_RECORDS: usize = 5000;

    /// Largest page size the simulated source will serve
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Base latency per simulated page (milliseconds)
    pub const BASE_LATENCY_MS: u64 = 30;

    /// Extra latency per `page % 5` step (milliseconds)
    pub const LATENCY_STEP_MS: u64 = 10;

    /// Route the simulated pages are served from (also used in page links)
    pub const PAGE_ROUTE: &str = "/sim/coins";
}

/// Default number of ranked entries before the "Others" rollup
pub const DEFAULT_TOP_N: usize = 50;

/// Display name of the synthetic rollup point
pub const OTHERS_NAME: &str = "Others";

/// Default HTTP port for `serve`
pub const DEFAULT_PORT: u16 = 8080;

/// Per-request timeout for the HTTP page source (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
