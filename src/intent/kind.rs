//! Analysis kinds

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The closed set of analysis kinds the dispatcher understands
///
/// Anything else lands in `Other`, which routes to the fallback variant.
/// Adding a new kind means adding a variant here and an arm in the
/// dispatcher, not matching strings ad hoc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisKind {
    Count,
    Sum,
    Average,
    Min,
    Max,
    Median,
    Variance,
    StdDev,
    Trend,
    TopN,
    Histogram,
    Comparison,
    RelativeChange,
    Correlation,
    /// Unrecognized kind, carrying the original string
    Other(String),
}

impl Default for AnalysisKind {
    fn default() -> Self {
        AnalysisKind::Other(String::new())
    }
}

impl AnalysisKind {
    /// Parse a kind string. Never fails: unknown strings become `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "count" => AnalysisKind::Count,
            "sum" | "total" => AnalysisKind::Sum,
            "average" | "avg" | "mean" => AnalysisKind::Average,
            "min" | "minimum" => AnalysisKind::Min,
            "max" | "maximum" => AnalysisKind::Max,
            "median" => AnalysisKind::Median,
            "variance" | "var" => AnalysisKind::Variance,
            "std_dev" | "stddev" | "std" | "standard_deviation" => AnalysisKind::StdDev,
            "trend" | "time_series" => AnalysisKind::Trend,
            "top_n" | "topn" | "top" | "most_common" => AnalysisKind::TopN,
            "histogram" | "distribution" => AnalysisKind::Histogram,
            "comparison" | "compare" => AnalysisKind::Comparison,
            "relative_change" | "change_from_baseline" => AnalysisKind::RelativeChange,
            "correlation" | "corr" => AnalysisKind::Correlation,
            _ => AnalysisKind::Other(s.to_string()),
        }
    }

    /// The canonical name of this kind
    pub fn as_str(&self) -> &str {
        match self {
            AnalysisKind::Count => "count",
            AnalysisKind::Sum => "sum",
            AnalysisKind::Average => "average",
            AnalysisKind::Min => "min",
            AnalysisKind::Max => "max",
            AnalysisKind::Median => "median",
            AnalysisKind::Variance => "variance",
            AnalysisKind::StdDev => "std_dev",
            AnalysisKind::Trend => "trend",
            AnalysisKind::TopN => "top_n",
            AnalysisKind::Histogram => "histogram",
            AnalysisKind::Comparison => "comparison",
            AnalysisKind::RelativeChange => "relative_change",
            AnalysisKind::Correlation => "correlation",
            AnalysisKind::Other(s) if s.is_empty() => "unknown",
            AnalysisKind::Other(s) => s,
        }
    }

    /// Simple aggregates: count, sum, average, min, max
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            AnalysisKind::Count
                | AnalysisKind::Sum
                | AnalysisKind::Average
                | AnalysisKind::Min
                | AnalysisKind::Max
        )
    }

    /// Statistical aggregates: median, variance, standard deviation
    pub fn is_statistical(&self) -> bool {
        matches!(
            self,
            AnalysisKind::Median | AnalysisKind::Variance | AnalysisKind::StdDev
        )
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnalysisKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(AnalysisKind::parse(&s))
    }
}

impl Serialize for AnalysisKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
