use serde::{Deserialize, Serialize};
use std::fmt;

/// Performance snapshot for a single cryptocurrency
///
/// Produced by a paged source and consumed read-only by the fetcher and
/// the aggregator. Values are percentage changes over each window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinPerformance {
    /// Unique display name
    pub cryptocurrency: String,
    pub perf_24h: f64,
    pub perf_7d: f64,
    pub perf_30d: f64,
    pub perf_90d: f64,
}

/// Numeric field of [`CoinPerformance`] a series is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "perf_24h")]
    Perf24h,
    #[serde(rename = "perf_7d")]
    Perf7d,
    #[serde(rename = "perf_30d")]
    Perf30d,
    #[serde(rename = "perf_90d")]
    Perf90d,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Perf7d
    }
}

impl Metric {
    /// Every tracked metric, shortest window first
    pub const ALL: [Metric; 4] = [
        Metric::Perf24h,
        Metric::Perf7d,
        Metric::Perf30d,
        Metric::Perf90d,
    ];

    /// Select this metric's value from a record
    pub fn value_of(&self, record: &CoinPerformance) -> f64 {
        match self {
            Metric::Perf24h => record.perf_24h,
            Metric::Perf7d => record.perf_7d,
            Metric::Perf30d => record.perf_30d,
            Metric::Perf90d => record.perf_90d,
        }
    }

    /// Parse from string (case-insensitive, accepts the bare window too)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "perf_24h" | "24h" => Ok(Metric::Perf24h),
            "perf_7d" | "7d" => Ok(Metric::Perf7d),
            "perf_30d" | "30d" => Ok(Metric::Perf30d),
            "perf_90d" | "90d" => Ok(Metric::Perf90d),
            _ => Err(format!(
                "Invalid metric: '{}'. Valid values: perf_24h, perf_7d, perf_30d, perf_90d",
                s
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Perf24h => "perf_24h",
            Metric::Perf7d => "perf_7d",
            Metric::Perf30d => "perf_30d",
            Metric::Perf90d => "perf_90d",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
