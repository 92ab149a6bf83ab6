//! Summary command
//!
//! Fetches the full dataset through the concurrent paginated fetcher and prints
//! the precomputed Top-N series as JSON on stdout.
//!
//! Usage:
//! - Simulated source: `coinperf summary --top 20`
//! - Single mode: `coinperf summary --agg sumAll --metric perf_30d`
//! - Remote source: `coinperf summary --source-url http://localhost:8080`

use crate::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::error::Result;
use crate::models::{FetchConfig, Metric, OthersAggregation};
use crate::services::{DashboardService, HttpPagedSource, PagedSource, SimulatedSource};
use std::time::Duration;
use tracing::info;

/// Options for one summary run
///
/// Fetch overrides left as `None` fall back to the `FETCH_*` environment.
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    pub top: usize,
    pub agg: Option<OthersAggregation>,
    pub metric: Option<Metric>,
    pub source_url: Option<String>,
    pub page_size: Option<u32>,
    pub concurrency: Option<usize>,
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub throttle_ms: Option<u64>,
    pub keep_order: bool,
    pub pretty: bool,
}

impl SummaryOptions {
    /// Apply command-line overrides on top of `base`
    pub fn fetch_config(&self, base: FetchConfig) -> FetchConfig {
        let mut config = base;
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(ms) = self.base_delay_ms {
            config.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.throttle_ms {
            config.throttle = Duration::from_millis(ms);
        }
        if self.keep_order {
            config.keep_order = true;
        }
        config
    }
}

/// Run summary command
pub async fn run(options: SummaryOptions) {
    match render(&options).await {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("❌ Summary failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Fetch and render the summary JSON without printing it
pub async fn render(options: &SummaryOptions) -> Result<String> {
    let config = options.fetch_config(FetchConfig::from_env());
    config.validate()?;

    match &options.source_url {
        Some(url) => {
            let source = HttpPagedSource::new(url, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))?;
            info!(url = source.base_url(), "Using HTTP page source");
            render_from(source, config, options).await
        }
        None => {
            info!("Using simulated page source");
            render_from(SimulatedSource::default(), config, options).await
        }
    }
}

async fn render_from<S: PagedSource + 'static>(
    source: S,
    config: FetchConfig,
    options: &SummaryOptions,
) -> Result<String> {
    let service = DashboardService::new(source, config);

    let value = match options.agg {
        Some(agg) => {
            let mut summary = service.summary(options.top, agg).await?;
            if let Some(metric) = options.metric {
                summary = summary.only(metric);
            }
            serde_json::to_value(summary)?
        }
        None => {
            let mut bundle = service.bundle(options.top).await?;
            if let Some(metric) = options.metric {
                bundle.by_agg = bundle
                    .by_agg
                    .into_iter()
                    .map(|(agg, summary)| (agg, summary.only(metric)))
                    .collect();
            }
            serde_json::to_value(bundle)?
        }
    };

    let json = if options.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(json)
}

/// Parse an aggregation mode from a CLI value
pub fn parse_agg(value: &str) -> std::result::Result<OthersAggregation, String> {
    OthersAggregation::from_str(value)
}

/// Parse a metric from a CLI value
pub fn parse_metric(value: &str) -> std::result::Result<Metric, String> {
    Metric::from_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn fast_options() -> SummaryOptions {
        SummaryOptions {
            top: 5,
            concurrency: Some(8),
            page_size: Some(100),
            max_retries: Some(0),
            base_delay_ms: Some(1),
            throttle_ms: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_overrides_replace_base() {
        let options = SummaryOptions {
            page_size: Some(25),
            concurrency: Some(3),
            base_delay_ms: Some(10),
            keep_order: true,
            ..Default::default()
        };

        let config = options.fetch_config(FetchConfig::default());

        assert_eq!(config.page_size, 25);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.base_delay, Duration::from_millis(10));
        assert!(config.keep_order);
        // Untouched fields keep the base value
        assert_eq!(config.max_retries, FetchConfig::default().max_retries);
    }

    #[test]
    fn test_keep_order_flag_does_not_clear_base() {
        let options = SummaryOptions::default();
        let config = options.fetch_config(FetchConfig::default().with_keep_order(true));
        assert!(config.keep_order);
    }

    #[tokio::test]
    async fn test_render_single_mode_single_metric() {
        let options = SummaryOptions {
            agg: Some(OthersAggregation::SumAll),
            metric: Some(Metric::Perf30d),
            ..fast_options()
        };

        let json = render(&options).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["top"], 5);
        let series = value["seriesByMetric"].as_object().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series["perf_30d"].as_array().unwrap().len(), 6);
        assert_eq!(series["perf_30d"][5]["name"], "Others");
    }

    #[tokio::test]
    async fn test_render_bundle() {
        let json = render(&fast_options()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["recordCount"], 5000);
        assert_eq!(value["defaultMetric"], "perf_7d");
        assert_eq!(value["defaultAgg"], "mean");
        for agg in ["sumPositive", "sumAll", "mean"] {
            assert_eq!(value["byAgg"][agg]["seriesByMetric"].as_object().unwrap().len(), 4);
        }
    }

    #[tokio::test]
    async fn test_render_rejects_invalid_config() {
        let options = SummaryOptions {
            concurrency: Some(0),
            ..fast_options()
        };
        assert!(matches!(render(&options).await, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_render_rejects_bad_source_url() {
        let options = SummaryOptions {
            source_url: Some("ftp://example.com".to_string()),
            ..fast_options()
        };
        assert!(matches!(render(&options).await, Err(AppError::Config(_))));
    }
}
