/// How tail records are rolled up into the "Others" point
///
/// Determines the reduction applied to every record outside the Top-N.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OthersAggregation {
    /// Sum of tail values, negative values ignored
    SumPositive,

    /// Sum of all tail values
    SumAll,

    /// Arithmetic mean of tail values
    Mean,
}

impl Default for OthersAggregation {
    fn default() -> Self {
        OthersAggregation::SumPositive
    }
}

impl OthersAggregation {
    /// Every aggregation mode, in precompute order
    pub const ALL: [OthersAggregation; 3] = [
        OthersAggregation::SumPositive,
        OthersAggregation::SumAll,
        OthersAggregation::Mean,
    ];

    /// Reduce tail values into a single scalar (unrounded)
    ///
    /// Callers guarantee `values` is non-empty; an empty mean yields 0.
    pub fn reduce(&self, values: impl Iterator<Item = f64>) -> f64 {
        match self {
            OthersAggregation::SumPositive => values.map(|v| v.max(0.0)).sum(),
            OthersAggregation::SumAll => values.sum(),
            OthersAggregation::Mean => {
                let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                if count == 0 {
                    0.0
                } else {
                    sum / count as f64
                }
            }
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "sumpositive" | "sum_positive" | "sum-positive" => Ok(OthersAggregation::SumPositive),
            "sumall" | "sum_all" | "sum-all" | "sum" => Ok(OthersAggregation::SumAll),
            "mean" | "avg" | "average" => Ok(OthersAggregation::Mean),
            _ => Err(format!(
                "Invalid aggregation: '{}'. Valid values: sumPositive, sumAll, mean",
                s
            )),
        }
    }

    /// Convert to string representation (wire name)
    pub fn as_str(&self) -> &'static str {
        match self {
            OthersAggregation::SumPositive => "sumPositive",
            OthersAggregation::SumAll => "sumAll",
            OthersAggregation::Mean => "mean",
        }
    }
}

impl fmt::Display for OthersAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
