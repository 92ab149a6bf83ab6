use crate::error::Result;
use crate::models::{
    DashboardBundle, FetchConfig, Metric, OthersAggregation, PrecomputedSummary,
};
use crate::services::summary::{precompute_all_aggs, precompute_all_metrics};
use crate::services::{PageFetcher, PagedSource};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Fetches the full dataset and precomputes chart series from it
///
/// Each call performs a fresh fetch; nothing is cached between calls. A
/// fetch failure is returned as-is and no partial summary is produced.
pub struct DashboardService<S: ?Sized> {
    fetcher: PageFetcher<S>,
    fetch_config: FetchConfig,
}

impl<S: PagedSource + 'static> DashboardService<S> {
    pub fn new(source: S, fetch_config: FetchConfig) -> Self {
        Self {
            fetcher: PageFetcher::new(source),
            fetch_config,
        }
    }
}

impl<S: PagedSource + ?Sized + 'static> DashboardService<S> {
    pub fn from_shared(source: Arc<S>, fetch_config: FetchConfig) -> Self {
        Self {
            fetcher: PageFetcher::from_shared(source),
            fetch_config,
        }
    }

    pub fn fetch_config(&self) -> &FetchConfig {
        &self.fetch_config
    }

    pub fn fetcher(&self) -> &PageFetcher<S> {
        &self.fetcher
    }

    /// Fetch, then build every metric's series under one aggregation mode
    #[instrument(skip(self))]
    pub async fn summary(&self, top_n: usize, agg: OthersAggregation) -> Result<PrecomputedSummary> {
        let records = self.fetcher.fetch_all(&self.fetch_config).await?;
        Ok(precompute_all_metrics(&records, top_n, agg))
    }

    /// Fetch once, then precompute every metric under every aggregation mode
    #[instrument(skip(self))]
    pub async fn bundle(&self, top_n: usize) -> Result<DashboardBundle> {
        let records = self.fetcher.fetch_all(&self.fetch_config).await?;

        let started = Instant::now();
        let by_agg = precompute_all_aggs(&records, top_n);
        info!(
            records = records.len(),
            top_n,
            modes = by_agg.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Precomputed dashboard series"
        );

        Ok(DashboardBundle {
            top: top_n,
            default_metric: Metric::default(),
            default_agg: OthersAggregation::Mean,
            generated_at: Utc::now(),
            record_count: records.len(),
            by_agg,
        })
    }
}
