//! Relative-change analysis variant: baseline vs. follow-up

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::artifact::Artifact;
use crate::catalog::Catalog;
use crate::intent::{AnalysisKind, Intent};
use crate::predicate::build_predicate;
use crate::resolver::{resolve_field, Resolution};
use super::script::{error_result, fetch_block, indent, py_str};
use super::{fallback, DEFAULT_METRIC};

/// Default baseline window, days relative to enrollment
const BASELINE_WINDOW: (i64, i64) = (-30, 30);
/// Default follow-up window, days relative to enrollment
const FOLLOWUP_WINDOW: (i64, i64) = (150, 210);

/// Matches relative-window specifications like "enrollment date + 6 months"
static WINDOW_SPEC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)enrollment[_ ]?date\s*\+\s*(\d+)\s*month").unwrap());

/// Generate a relative-change analysis: per-patient change between the
/// earliest baseline-window observation and the earliest follow-up-window
/// observation, relative to each patient's enrollment date
///
/// Only metrics owned by an observation table are supported; anything
/// else routes to the fallback variant. Date-range filters and the global
/// time range are excluded from the predicate because the windowing is
/// computed from day offsets, not query constraints.
pub fn generate(catalog: &Catalog, intent: &Intent) -> Artifact {
    let metrics = intent.metrics(DEFAULT_METRIC);
    let metric_name = metrics[0];

    let Resolution::Resolved { field, table } = resolve_field(catalog, metric_name) else {
        debug!(metric = metric_name, "relative-change metric unresolved, using fallback");
        return fallback::generate(intent);
    };
    if !catalog.is_observation_table(table) {
        debug!(metric = metric_name, table, "metric table has no observations, using fallback");
        return fallback::generate(intent);
    }
    let Some(join) = catalog.relationship_of(table) else {
        return fallback::generate(intent);
    };

    // Windowing happens on day offsets; a date-range constraint in the
    // query would fight it. Work on a copy with those stripped.
    let mut working = intent.clone();
    working.time_range = None;
    working.filters.retain(|f| f.date_range.is_none());
    let predicate = build_predicate(catalog, &working);

    let hub = &join.references;
    let enrollment = catalog
        .table(hub)
        .and_then(|t| t.get_column("enrollment_date"))
        .map(|c| c.name.as_str())
        .unwrap_or("enrollment_date");

    let mut query = format!(
        "SELECT {hub}.{key} AS patient_id, {hub}.{enrollment} AS enrollment_date, \
         {table}.date AS obs_date, {table}.{field} AS {field} \
         FROM {table} JOIN {hub} ON {condition}",
        hub = hub,
        key = join.ref_column,
        enrollment = enrollment,
        table = table,
        field = field,
        condition = join.condition(),
    );
    if !predicate.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&predicate);
    }

    let (base_lo, base_hi) = BASELINE_WINDOW;
    let (follow_lo, follow_hi) = followup_window(intent);

    let summary = [
        "change = merged['baseline'] - merged['followup']".to_string(),
        "result = {".to_string(),
        "    'mean_change': float(change.mean()),".to_string(),
        "    'patients': int(len(merged)),".to_string(),
        format!("    'baseline_window': [{}, {}],", base_lo, base_hi),
        format!("    'followup_window': [{}, {}],", follow_lo, follow_hi),
        "}".to_string(),
    ]
    .join("\n");

    let windowed = format!(
        "df['enrollment_date'] = pd.to_datetime(df['enrollment_date'])\n\
         df['obs_date'] = pd.to_datetime(df['obs_date'])\n\
         df['day_offset'] = (df['obs_date'] - df['enrollment_date']).dt.days\n\
         baseline = df[(df['day_offset'] >= {base_lo}) & (df['day_offset'] <= {base_hi})]\n\
         followup = df[(df['day_offset'] >= {follow_lo}) & (df['day_offset'] <= {follow_hi})]\n\
         baseline = baseline.sort_values('day_offset').groupby('patient_id')[{metric}].first()\n\
         followup = followup.sort_values('day_offset').groupby('patient_id')[{metric}].first()\n\
         merged = pd.concat([baseline.rename('baseline'), followup.rename('followup')], axis=1, join='inner')",
        base_lo = base_lo,
        base_hi = base_hi,
        follow_lo = follow_lo,
        follow_hi = follow_hi,
        metric = py_str(field),
    );
    let body = format!(
        "{windowed}\nif merged.empty:\n    result = {no_pairs}\nelse:\n{summary}",
        windowed = windowed,
        no_pairs = error_result("No patients with observations in both windows"),
        summary = indent(&summary, 1),
    );

    let empty = error_result("No data available for relative change analysis");
    let code = fetch_block(&query, &empty, &body);
    Artifact::new(AnalysisKind::RelativeChange, query, code)
}

/// The follow-up window: the default [150, 210] unless a parameter value
/// matches "enrollment date + N months", in which case it widens to
/// [(N-1)*30, (N+1)*30]
fn followup_window(intent: &Intent) -> (i64, i64) {
    let mut keys: Vec<&String> = intent.params.keys().collect();
    keys.sort();
    for key in keys {
        let Some(value) = intent.params.get(key).and_then(|v| v.as_str()) else {
            continue;
        };
        if let Some(captures) = WINDOW_SPEC.captures(value) {
            if let Ok(months) = captures[1].parse::<i64>() {
                return ((months - 1) * 30, (months + 1) * 30);
            }
        }
    }
    FOLLOWUP_WINDOW
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn load_test_catalog() -> Catalog {
        Catalog::from_file("test_data/clinic.yaml").unwrap()
    }

    fn change_intent(metric: &str) -> Intent {
        Intent {
            kind: AnalysisKind::RelativeChange,
            target_field: Some(metric.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_windows() {
        let catalog = load_test_catalog();
        let artifact = generate(&catalog, &change_intent("weight"));

        assert_eq!(artifact.kind, AnalysisKind::RelativeChange);
        assert!(artifact.code.contains("df['day_offset'] >= -30"));
        assert!(artifact.code.contains("df['day_offset'] <= 30"));
        assert!(artifact.code.contains("df['day_offset'] >= 150"));
        assert!(artifact.code.contains("df['day_offset'] <= 210"));
        assert!(artifact.code.contains("'baseline_window': [-30, 30]"));
        assert!(artifact.code.contains("'followup_window': [150, 210]"));
    }

    #[test]
    fn test_query_joins_patients() {
        let catalog = load_test_catalog();
        let artifact = generate(&catalog, &change_intent("weight"));
        assert_eq!(
            artifact.query,
            "SELECT patients.id AS patient_id, patients.enrollment_date AS enrollment_date, \
             vitals.date AS obs_date, vitals.weight AS weight \
             FROM vitals JOIN patients ON vitals.patient_id = patients.id"
        );
    }

    #[test]
    fn test_window_override_from_params() {
        let catalog = load_test_catalog();
        let mut intent = change_intent("score_value");
        intent.params = HashMap::from([(
            "followup".to_string(),
            json!("enrollment date + 6 months"),
        )]);
        let artifact = generate(&catalog, &intent);

        assert!(artifact.code.contains("'followup_window': [150, 210]"));

        intent.params = HashMap::from([(
            "followup".to_string(),
            json!("enrollment_date + 12 months"),
        )]);
        let artifact = generate(&catalog, &intent);
        assert!(artifact.code.contains("'followup_window': [330, 390]"));
    }

    #[test]
    fn test_date_filters_stripped() {
        let catalog = load_test_catalog();
        let mut intent = change_intent("weight");
        intent.time_range = Some(crate::intent::TimeRange {
            start: crate::intent::TimeValue::Text("2023-01-01".to_string()),
            end: crate::intent::TimeValue::Text("2023-12-31".to_string()),
        });
        let artifact = generate(&catalog, &intent);
        assert!(!artifact.query.contains("BETWEEN"));
    }

    #[test]
    fn test_non_observation_metric_falls_back() {
        let catalog = load_test_catalog();
        // age lives on patients, which has no observations
        let artifact = generate(&catalog, &change_intent("age"));
        assert!(artifact.query.is_empty());
        assert!(artifact.code.contains("Unable to generate analysis code"));

        // medications has start_date, not date
        let artifact = generate(&catalog, &change_intent("dosage"));
        assert!(artifact.query.is_empty());
        assert!(artifact.code.contains("Unable to generate analysis code"));
    }

    #[test]
    fn test_structured_error_results() {
        let catalog = load_test_catalog();
        let artifact = generate(&catalog, &change_intent("weight"));
        assert!(artifact
            .code
            .contains("result = {'error': 'No data available for relative change analysis'}"));
        assert!(artifact
            .code
            .contains("result = {'error': 'No patients with observations in both windows'}"));
    }
}
