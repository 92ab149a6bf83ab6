mod aggregation;
mod fetch_config;
mod page;
mod record;
mod series;

pub use aggregation::OthersAggregation;
pub use fetch_config::FetchConfig;
pub use page::{Page, PageLinks};
pub use record::{CoinPerformance, Metric};
pub use series::{
    DashboardBundle, PrecomputedByAgg, PrecomputedSummary, Series, SeriesByMetric, SeriesPoint,
};
