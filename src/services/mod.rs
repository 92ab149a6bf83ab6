mod paged_source;
pub mod dashboard;
pub mod http_source;
pub mod page_fetcher;
pub mod retry;
pub mod sim_source;
pub mod summary;

pub use dashboard::DashboardService;
pub use http_source::HttpPagedSource;
pub use page_fetcher::PageFetcher;
pub use paged_source::PagedSource;
pub use retry::with_retry;
pub use sim_source::SimulatedSource;
pub use summary::{build_top_n_series, precompute_all_aggs, precompute_all_metrics};
