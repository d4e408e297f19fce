//! Aggregate and statistical analysis variants

use crate::artifact::Artifact;
use crate::catalog::Catalog;
use crate::intent::{AnalysisKind, Intent};
use crate::predicate::build_predicate;
use super::query::{build_select, locate, SelectItem};
use super::script::{fetch_block, py_str, py_str_list};
use super::DEFAULT_METRIC;

/// Generate a simple aggregate: count, sum, average, min, max
///
/// Ungrouped count uses the row-count form rather than a per-field count.
/// Grouped single-metric results are scalar-keyed maps; multiple metrics
/// come back as a list of per-group records.
pub fn generate_aggregate(catalog: &Catalog, intent: &Intent) -> Artifact {
    if intent.kind == AnalysisKind::Count {
        return generate_count(catalog, intent);
    }

    let metrics = intent.metrics(DEFAULT_METRIC);
    let selection = Selection::build(catalog, intent, &metrics);
    let method = method_call(&intent.kind);

    let body = if selection.group_cols.is_empty() {
        ungrouped_body(&selection.metric_cols, method)
    } else {
        grouped_body(&selection, method)
    };

    let empty = if selection.group_cols.is_empty() && selection.metric_cols.len() == 1 {
        "None"
    } else {
        "{}"
    };

    let code = fetch_block(&selection.query, empty, &body);
    Artifact::new(intent.kind.clone(), selection.query, code)
}

/// Generate a statistical aggregate: median, variance, standard deviation
///
/// Variance and standard deviation use sample semantics (ddof=1), spelled
/// out in the generated code. Grouped results are nested maps keyed by
/// metric, then group.
pub fn generate_statistical(catalog: &Catalog, intent: &Intent) -> Artifact {
    let metrics = intent.metrics(DEFAULT_METRIC);
    let selection = Selection::build(catalog, intent, &metrics);
    let method = method_call(&intent.kind);

    let body = if selection.group_cols.is_empty() {
        ungrouped_body(&selection.metric_cols, method)
    } else {
        let group = group_spec(&selection.group_cols);
        let columns: Vec<&str> = selection.metric_cols.iter().map(|c| c.as_str()).collect();
        format!(
            "frame = df.groupby({})[{}].{}\n\
             result = {{column: {{str(k): (None if pd.isna(v) else float(v)) for k, v in frame[column].items()}} for column in frame.columns}}",
            group,
            py_str_list(&columns),
            method,
        )
    };

    let empty = if selection.group_cols.is_empty() && selection.metric_cols.len() == 1 {
        "None"
    } else {
        "{}"
    };

    let code = fetch_block(&selection.query, empty, &body);
    Artifact::new(intent.kind.clone(), selection.query, code)
}

fn generate_count(catalog: &Catalog, intent: &Intent) -> Artifact {
    let has_metric = intent.target_field.is_some() || !intent.fields.is_empty();
    let metrics = if has_metric {
        intent.metrics(DEFAULT_METRIC)
    } else {
        Vec::new()
    };
    let selection = Selection::build(catalog, intent, &metrics);

    let (body, empty) = if selection.group_cols.is_empty() {
        ("result = int(len(df))".to_string(), "0")
    } else {
        let group = group_spec(&selection.group_cols);
        (
            format!(
                "counts = df.groupby({}).size()\n\
                 result = {{str(k): int(v) for k, v in counts.items()}}",
                group,
            ),
            "{}",
        )
    };

    let code = fetch_block(&selection.query, empty, &body);
    Artifact::new(AnalysisKind::Count, selection.query, code)
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

/// The resolved column selection for one intent
struct Selection {
    query: String,
    metric_cols: Vec<String>,
    group_cols: Vec<String>,
}

impl Selection {
    /// Resolve groups and metrics, pick the primary table, and assemble
    /// the query. The primary table is the first metric's owner, falling
    /// back to the first group's owner, then the hub table.
    fn build(catalog: &Catalog, intent: &Intent, metrics: &[&str]) -> Selection {
        let metric_items: Vec<SelectItem> = metrics.iter().map(|m| locate(catalog, m)).collect();
        let group_items: Vec<SelectItem> =
            intent.group_by.iter().map(|g| locate(catalog, g)).collect();

        let primary = metric_items
            .iter()
            .chain(group_items.iter())
            .find_map(|i| i.table.clone())
            .unwrap_or_else(|| hub_table(catalog));

        let mut items: Vec<SelectItem> = Vec::new();
        items.extend(group_items.iter().cloned());
        items.extend(metric_items.iter().cloned());
        if items.is_empty() {
            // Row-count form: any column will do, use the primary key
            items.push(SelectItem {
                table: Some(primary.clone()),
                column: "id".to_string(),
                alias: None,
            });
        }

        let predicate = build_predicate(catalog, intent);
        let query = build_select(catalog, &primary, &items, &predicate);

        Selection {
            query,
            metric_cols: metric_items.into_iter().map(|i| i.column).collect(),
            group_cols: group_items.into_iter().map(|i| i.column).collect(),
        }
    }
}

/// The table every relationship references, or the first table as a last
/// resort
fn hub_table(catalog: &Catalog) -> String {
    catalog
        .relationships
        .first()
        .map(|j| j.references.clone())
        .or_else(|| catalog.tables.first().map(|t| t.name.clone()))
        .unwrap_or_else(|| "patients".to_string())
}

/// The pandas method invocation for an analysis kind
fn method_call(kind: &AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Sum => "sum()",
        AnalysisKind::Average => "mean()",
        AnalysisKind::Min => "min()",
        AnalysisKind::Max => "max()",
        AnalysisKind::Median => "median()",
        // Sample semantics: normalize by N-1
        AnalysisKind::Variance => "var(ddof=1)",
        AnalysisKind::StdDev => "std(ddof=1)",
        _ => "mean()",
    }
}

/// The groupby argument: a bare string for one group field, a list for
/// several
fn group_spec(group_cols: &[String]) -> String {
    if group_cols.len() == 1 {
        py_str(&group_cols[0])
    } else {
        let columns: Vec<&str> = group_cols.iter().map(|c| c.as_str()).collect();
        py_str_list(&columns)
    }
}

fn ungrouped_body(metric_cols: &[String], method: &str) -> String {
    if metric_cols.len() == 1 {
        format!(
            "value = df[{}].{}\nresult = None if pd.isna(value) else float(value)",
            py_str(&metric_cols[0]),
            method,
        )
    } else {
        let columns: Vec<&str> = metric_cols.iter().map(|c| c.as_str()).collect();
        format!(
            "result = {{}}\nfor column in {}:\n    value = df[column].{}\n    result[column] = None if pd.isna(value) else float(value)",
            py_str_list(&columns),
            method,
        )
    }
}

fn grouped_body(selection: &Selection, method: &str) -> String {
    let group = group_spec(&selection.group_cols);
    if selection.metric_cols.len() == 1 {
        format!(
            "series = df.groupby({})[{}].{}\n\
             result = {{str(k): (None if pd.isna(v) else float(v)) for k, v in series.items()}}",
            group,
            py_str(&selection.metric_cols[0]),
            method,
        )
    } else {
        let columns: Vec<&str> = selection.metric_cols.iter().map(|c| c.as_str()).collect();
        format!(
            "frame = df.groupby({})[{}].{}.reset_index()\nresult = frame.to_dict('records')",
            group,
            py_str_list(&columns),
            method,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Filter;
    use serde_json::json;

    fn load_test_catalog() -> Catalog {
        Catalog::from_file("test_data/clinic.yaml").unwrap()
    }

    #[test]
    fn test_ungrouped_average() {
        let catalog = load_test_catalog();
        let intent = Intent {
            kind: AnalysisKind::Average,
            target_field: Some("weight".to_string()),
            ..Default::default()
        };
        let artifact = generate_aggregate(&catalog, &intent);

        assert_eq!(artifact.kind, AnalysisKind::Average);
        assert_eq!(artifact.query, "SELECT vitals.weight FROM vitals");
        assert!(artifact.code.contains("df['weight'].mean()"));
        // Zero rows has a defined value
        assert!(artifact.code.contains("if df.empty:\n    result = None"));
    }

    #[test]
    fn test_default_metric_when_none_given() {
        let catalog = load_test_catalog();
        let intent = Intent {
            kind: AnalysisKind::Average,
            ..Default::default()
        };
        let artifact = generate_aggregate(&catalog, &intent);
        assert!(artifact.query.contains("vitals.weight"));
    }

    #[test]
    fn test_ungrouped_count_uses_row_count() {
        let catalog = load_test_catalog();
        let intent = Intent {
            kind: AnalysisKind::Count,
            filters: vec![Filter {
                field: "status".to_string(),
                value: Some(json!("active")),
                ..Default::default()
            }],
            ..Default::default()
        };
        let artifact = generate_aggregate(&catalog, &intent);

        assert_eq!(
            artifact.query,
            "SELECT patients.id FROM patients WHERE patients.active = 1"
        );
        assert!(artifact.code.contains("result = int(len(df))"));
        assert!(artifact.code.contains("if df.empty:\n    result = 0"));
    }

    #[test]
    fn test_grouped_count() {
        let catalog = load_test_catalog();
        let intent = Intent {
            kind: AnalysisKind::Count,
            group_by: vec!["gender".to_string()],
            ..Default::default()
        };
        let artifact = generate_aggregate(&catalog, &intent);
        assert_eq!(artifact.query, "SELECT patients.gender FROM patients");
        assert!(artifact.code.contains("df.groupby('gender').size()"));
    }

    #[test]
    fn test_grouped_single_metric_scalar_map() {
        let catalog = load_test_catalog();
        let intent = Intent {
            kind: AnalysisKind::Average,
            target_field: Some("bmi".to_string()),
            group_by: vec!["gender".to_string()],
            ..Default::default()
        };
        let artifact = generate_aggregate(&catalog, &intent);

        assert_eq!(
            artifact.query,
            "SELECT patients.gender, vitals.bmi FROM vitals \
             JOIN patients ON vitals.patient_id = patients.id"
        );
        assert!(artifact.code.contains("df.groupby('gender')['bmi'].mean()"));
    }

    #[test]
    fn test_grouped_multiple_metrics_records() {
        let catalog = load_test_catalog();
        let intent = Intent {
            kind: AnalysisKind::Max,
            target_field: Some("weight".to_string()),
            fields: vec!["bmi".to_string()],
            group_by: vec!["gender".to_string()],
            ..Default::default()
        };
        let artifact = generate_aggregate(&catalog, &intent);
        assert!(artifact
            .code
            .contains("df.groupby('gender')[['weight', 'bmi']].max().reset_index()"));
        assert!(artifact.code.contains("to_dict('records')"));
    }

    #[test]
    fn test_statistical_sample_semantics() {
        let catalog = load_test_catalog();
        let intent = Intent {
            kind: AnalysisKind::Variance,
            target_field: Some("weight".to_string()),
            ..Default::default()
        };
        let artifact = generate_statistical(&catalog, &intent);
        assert!(artifact.code.contains("var(ddof=1)"));
    }

    #[test]
    fn test_statistical_grouped_nested_map() {
        let catalog = load_test_catalog();
        let intent = Intent {
            kind: AnalysisKind::Median,
            target_field: Some("weight".to_string()),
            group_by: vec!["gender".to_string()],
            ..Default::default()
        };
        let artifact = generate_statistical(&catalog, &intent);
        assert!(artifact.code.contains("df.groupby('gender')[['weight']].median()"));
        assert!(artifact.code.contains("for column in frame.columns"));
    }
}
