//! Analysis intent types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use super::kind::AnalysisKind;

/// A structured description of a requested analysis
///
/// Produced by the external NL→intent parser and supplied per request.
/// This core never mutates an intent in place; variants that need to
/// alter filters (relative-change stripping its date windows) work on a
/// clone.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Intent {
    #[serde(default)]
    pub kind: AnalysisKind,
    /// Primary metric the analysis is about
    #[serde(default)]
    pub target_field: Option<String>,
    /// Additional metrics beyond the target
    #[serde(default)]
    pub fields: Vec<String>,
    /// Grouping fields
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Global time range applied to the whole analysis
    #[serde(default)]
    pub time_range: Option<TimeRange>,
    /// Open parameter map: top-N count, histogram bins, trend period,
    /// relative-window specs, and whatever future variants need
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
    /// The original natural-language request, carried through so the
    /// fallback variant can embed it
    #[serde(default)]
    pub request_text: Option<String>,
}

/// A single filter from the intent
///
/// At most one of `value`, `range`, `date_range` is meaningful.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Filter {
    pub field: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub range: Option<NumericRange>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

/// A numeric range; BETWEEN is only emitted when both bounds are present
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NumericRange {
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

/// A date range; BETWEEN is only emitted when both bounds are present
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<TimeValue>,
    #[serde(default)]
    pub end: Option<TimeValue>,
}

/// A comparison condition from the intent
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Condition {
    pub field: String,
    /// `=`, `!=`, `>`, `>=`, `<`, `<=`, `between`, `in`, `like`
    pub operator: String,
    pub value: serde_json::Value,
}

/// The global time range of the analysis
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeRange {
    pub start: TimeValue,
    pub end: TimeValue,
}

/// A point in time as the intent supplies it
///
/// Date-like values render as `YYYY-MM-DD`; anything already textual is
/// passed through unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TimeValue {
    Date(chrono::NaiveDate),
    Text(String),
}

impl TimeValue {
    /// Render for embedding in a query
    pub fn render(&self) -> String {
        match self {
            TimeValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            TimeValue::Text(s) => s.clone(),
        }
    }
}

impl Intent {
    /// The metrics this intent asks about: the target field plus any
    /// additional fields, or `default` when the intent names none.
    pub fn metrics<'a>(&'a self, default: &'a str) -> Vec<&'a str> {
        let mut metrics: Vec<&str> = Vec::new();
        if let Some(target) = &self.target_field {
            metrics.push(target.as_str());
        }
        for field in &self.fields {
            if !metrics.contains(&field.as_str()) {
                metrics.push(field.as_str());
            }
        }
        if metrics.is_empty() {
            metrics.push(default);
        }
        metrics
    }

    /// Look up an integer parameter under any of the given keys
    pub fn param_usize(&self, keys: &[&str], default: usize) -> usize {
        for key in keys {
            if let Some(value) = self.params.get(*key) {
                if let Some(n) = value.as_u64() {
                    return n as usize;
                }
            }
        }
        default
    }

    /// Look up a string parameter under any of the given keys
    pub fn param_str(&self, keys: &[&str]) -> Option<&str> {
        for key in keys {
            if let Some(value) = self.params.get(*key) {
                if let Some(s) = value.as_str() {
                    return Some(s);
                }
            }
        }
        None
    }
}
