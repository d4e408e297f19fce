//! Comparison and correlation analysis variants

use crate::artifact::Artifact;
use crate::catalog::Catalog;
use crate::intent::{AnalysisKind, Intent};
use crate::predicate::build_predicate;
use super::query::{build_select, locate};
use super::script::{error_result, fetch_block, indent, py_str};

/// Generate a group comparison: per-group mean and row count of the
/// target metric, grouped by the first grouping field
///
/// Missing inputs and empty data become structured error results; the
/// artifact itself is always produced.
pub fn generate_comparison(catalog: &Catalog, intent: &Intent) -> Artifact {
    let (Some(group_name), Some(target)) = (intent.group_by.first(), intent.target_field.as_ref())
    else {
        let code = format!("result = {}\n", error_result("Missing group_by or target_field"));
        return Artifact::new(AnalysisKind::Comparison, String::new(), code);
    };

    let group = locate(catalog, group_name);
    let metric = locate(catalog, target);
    let primary = metric
        .table
        .clone()
        .or_else(|| group.table.clone())
        .unwrap_or_else(|| "patients".to_string());

    let predicate = build_predicate(catalog, intent);
    let query = build_select(catalog, &primary, &[group.clone(), metric.clone()], &predicate);

    let body = format!(
        "grouped = df.groupby({group})[{metric}].agg(['mean', 'count'])\n\
         result = {{str(k): {{'mean': float(row['mean']), 'count': int(row['count'])}} for k, row in grouped.iterrows()}}",
        group = py_str(&group.column),
        metric = py_str(&metric.column),
    );

    let empty = error_result("No data available for comparison analysis");
    let code = fetch_block(&query, &empty, &body);
    Artifact::new(AnalysisKind::Comparison, query, code)
}

/// Generate a correlation analysis: the linear correlation coefficient
/// between the target metric and the first additional field
pub fn generate_correlation(catalog: &Catalog, intent: &Intent) -> Artifact {
    let first = intent.target_field.as_deref();
    let second = intent.fields.first().map(|f| f.as_str());
    let (Some(first), Some(second)) = (first, second) else {
        let code = format!(
            "result = {}\n",
            error_result("Correlation requires two numeric fields"),
        );
        return Artifact::new(AnalysisKind::Correlation, String::new(), code);
    };

    let left = locate(catalog, first);
    let right = locate(catalog, second);
    let primary = left
        .table
        .clone()
        .or_else(|| right.table.clone())
        .unwrap_or_else(|| "patients".to_string());

    let predicate = build_predicate(catalog, intent);
    let query = build_select(catalog, &primary, &[left.clone(), right.clone()], &predicate);

    let insufficient = error_result("Not enough paired data for correlation analysis");
    let coefficient = format!(
        "result = {{'correlation_coefficient': float(pair[{left}].corr(pair[{right}]))}}",
        left = py_str(&left.column),
        right = py_str(&right.column),
    );
    let body = format!(
        "pair = df[[{left}, {right}]].dropna()\nif len(pair) < 2:\n    result = {insufficient}\nelse:\n{body}",
        left = py_str(&left.column),
        right = py_str(&right.column),
        insufficient = insufficient,
        body = indent(&coefficient, 1),
    );

    let code = fetch_block(&query, &insufficient, &body);
    Artifact::new(AnalysisKind::Correlation, query, code)
}
