use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Metric, OthersAggregation};

/// A single chart point: a ranked record or the "Others" rollup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub name: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Points in rank order, "Others" last when present
pub type Series = Vec<SeriesPoint>;

/// One series per tracked metric
pub type SeriesByMetric = BTreeMap<Metric, Series>;

/// Top-N series for every metric under a single aggregation mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecomputedSummary {
    /// Effective N used for every series
    pub top: usize,
    pub series_by_metric: SeriesByMetric,
}

impl PrecomputedSummary {
    /// Keep only the series for `metric`
    pub fn only(mut self, metric: Metric) -> Self {
        self.series_by_metric.retain(|m, _| *m == metric);
        self
    }
}

/// Precomputed summaries keyed by aggregation mode
pub type PrecomputedByAgg = BTreeMap<OthersAggregation, PrecomputedSummary>;

/// Everything the presentation layer needs to switch metric or mode locally
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBundle {
    pub top: usize,
    pub default_metric: Metric,
    pub default_agg: OthersAggregation,
    pub generated_at: DateTime<Utc>,
    /// Number of records the summaries were computed from
    pub record_count: usize,
    pub by_agg: PrecomputedByAgg,
}
