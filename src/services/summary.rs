//! Top-N + Others aggregation
//!
//! Reduces a combined dataset into chart-ready series: the N best records
//! for a metric followed by a single "Others" point that rolls up the rest.
//! Everything here is pure and synchronous.

use crate::constants::OTHERS_NAME;
use crate::models::{
    CoinPerformance, Metric, OthersAggregation, PrecomputedByAgg, PrecomputedSummary, Series,
    SeriesByMetric, SeriesPoint,
};
use crate::utils::round2;

/// Build the ranked series for `metric` with an "Others" rollup
///
/// Records are ranked by descending metric value; equal values keep their
/// input order. The result has `min(n, len)` ranked points plus one
/// "Others" point when any record falls outside the top `n`.
pub fn build_top_n_series(
    records: &[CoinPerformance],
    metric: Metric,
    n: usize,
    agg: OthersAggregation,
) -> Series {
    if records.is_empty() {
        return Series::new();
    }

    let mut ranked: Vec<&CoinPerformance> = records.iter().collect();
    // Stable: ties preserve input order
    ranked.sort_by(|a, b| metric.value_of(b).total_cmp(&metric.value_of(a)));

    let split = n.min(ranked.len());
    let (top, tail) = ranked.split_at(split);

    let mut series: Series = top
        .iter()
        .map(|r| SeriesPoint::new(r.cryptocurrency.clone(), metric.value_of(r)))
        .collect();

    if tail.is_empty() {
        return series;
    }

    let others = agg.reduce(tail.iter().map(|r| metric.value_of(r)));
    series.push(SeriesPoint::new(OTHERS_NAME, round2(others)));
    series
}

/// Build one series per tracked metric under a single aggregation mode
pub fn precompute_all_metrics(
    records: &[CoinPerformance],
    n: usize,
    agg: OthersAggregation,
) -> PrecomputedSummary {
    let series_by_metric: SeriesByMetric = Metric::ALL
        .iter()
        .map(|&metric| (metric, build_top_n_series(records, metric, n, agg)))
        .collect();

    PrecomputedSummary {
        top: n,
        series_by_metric,
    }
}

/// Precompute every metric under every aggregation mode
pub fn precompute_all_aggs(records: &[CoinPerformance], n: usize) -> PrecomputedByAgg {
    OthersAggregation::ALL
        .iter()
        .map(|&agg| (agg, precompute_all_metrics(records, n, agg)))
        .collect()
}
