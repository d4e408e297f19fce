//! Top-N and histogram analysis variants

use crate::artifact::Artifact;
use crate::catalog::Catalog;
use crate::intent::{AnalysisKind, Intent};
use crate::predicate::build_predicate;
use super::query::{build_select, locate};
use super::script::{error_result, fetch_block, indent, py_str};
use super::DEFAULT_METRIC;

/// Generate a top-N analysis: the N most frequent distinct values of the
/// metric, by descending count
///
/// Tie order follows first-encountered order in the frame and is not
/// guaranteed.
pub fn generate_top_n(catalog: &Catalog, intent: &Intent) -> Artifact {
    let metrics = intent.metrics(DEFAULT_METRIC);
    let metric = locate(catalog, metrics[0]);
    let primary = metric.table.clone().unwrap_or_else(|| "patients".to_string());

    let predicate = build_predicate(catalog, intent);
    let query = build_select(catalog, &primary, &[metric.clone()], &predicate);

    let limit = intent.param_usize(&["limit", "n", "top_n"], 10);
    let body = format!(
        "counts = df[{}].value_counts().head({})\n\
         result = {{str(k): int(v) for k, v in counts.items()}}",
        py_str(&metric.column),
        limit,
    );

    let code = fetch_block(&query, "{}", &body);
    Artifact::new(AnalysisKind::TopN, query, code)
}

/// Generate a histogram: equal-width bin counts and edges over the
/// observed min/max of the metric
pub fn generate_histogram(catalog: &Catalog, intent: &Intent) -> Artifact {
    let metrics = intent.metrics(DEFAULT_METRIC);
    let metric = locate(catalog, metrics[0]);
    let primary = metric.table.clone().unwrap_or_else(|| "patients".to_string());

    let predicate = build_predicate(catalog, intent);
    let query = build_select(catalog, &primary, &[metric.clone()], &predicate);

    let bins = intent.param_usize(&["bins"], 10);
    let empty = error_result("No data available for histogram analysis");
    let binned = format!(
        "counts, edges = np.histogram(values, bins={})\n\
         result = {{'counts': [int(c) for c in counts], 'bin_edges': [float(e) for e in edges]}}",
        bins,
    );
    let body = format!(
        "values = df[{}].dropna()\nif values.empty:\n    result = {}\nelse:\n{}",
        py_str(&metric.column),
        empty,
        indent(&binned, 1),
    );

    let code = fetch_block(&query, &empty, &body);
    Artifact::new(AnalysisKind::Histogram, query, code)
}
