//! Deterministic rewrites and error-driven repair of schema references

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::catalog::Catalog;
use crate::extractor::extract_references;
use super::fuzzy::best_matches;
use super::validate::{validate, ValidationResult};

/// "unknown table: X" style conditions in an error message
static UNKNOWN_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:unknown|no such|missing)\s+table:?\s*['"]?([A-Za-z0-9_.]+)"#).unwrap()
});

/// "unknown column: X" style conditions, optionally qualified as table.column
static UNKNOWN_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:unknown|no such|missing)\s+column:?\s*['"]?([A-Za-z0-9_.]+)"#).unwrap()
});

/// Normalize known singular table-name tokens to their canonical plural
/// forms
///
/// Word-boundary guarded, so compound tokens (`patient_id`) and
/// already-plural names are never touched. Singular forms that double as
/// known column names or aliases are skipped; rewriting those would
/// corrupt legitimate column references. Idempotent and
/// order-independent.
pub fn normalize_table_names(query: &str, catalog: &Catalog) -> String {
    let mut revised = query.to_string();
    for (singular, plural) in catalog.singular_forms() {
        if catalog.any_table_has_column(&singular) || catalog.canonical_field(&singular).is_some()
        {
            continue;
        }
        revised = replace_token(&revised, &singular, plural);
    }
    revised
}

/// Attempt to repair a query given a schema error message
///
/// Returns the revised text, or `None` when no fix applies, in which
/// case the input is to be used unchanged. Never fails, and is
/// idempotent: re-applying the same fix to already-repaired text changes
/// nothing.
pub fn attempt_fix(query: &str, error: &str, catalog: &Catalog) -> Option<String> {
    let mut revised = query.to_string();

    if let Some(cap) = UNKNOWN_TABLE_RE.captures(error) {
        revised = fix_unknown_table(&revised, &cap[1], catalog);
    }
    if let Some(cap) = UNKNOWN_COLUMN_RE.captures(error) {
        revised = fix_unknown_column(&revised, &cap[1], catalog);
    }

    // Domain repair: the patient table's own identifier is `id`; queries
    // borrowing the foreign-key spelling get rewritten
    revised = replace_token(&revised, "patients.patient_id", "patients.id");

    if revised == query {
        None
    } else {
        debug!(original = query, revised = %revised, "repair applied");
        Some(revised)
    }
}

/// Validate, repairing at most once
///
/// Runs the deterministic plural normalization, validates, and on failure
/// makes a single repair attempt followed by a single re-validation. A
/// repair pass that produces no textual change terminates the loop
/// immediately.
pub fn validate_and_repair(query: &str, catalog: &Catalog) -> (String, ValidationResult) {
    let normalized = normalize_table_names(query, catalog);
    let result = validate(&normalized, catalog);
    if result.valid {
        return (normalized, result);
    }

    let Some(message) = result.message.clone() else {
        return (normalized, result);
    };
    match attempt_fix(&normalized, &message, catalog) {
        Some(revised) => {
            let result = validate(&revised, catalog);
            (revised, result)
        }
        None => (normalized, result),
    }
}

fn fix_unknown_table(query: &str, bad: &str, catalog: &Catalog) -> String {
    // The plural form first
    let plural = format!("{}s", bad);
    if let Some(table) = catalog.table(&plural) {
        return replace_token(query, bad, &table.name);
    }

    // Fuzzy candidates against known table names
    let names = catalog.table_names();
    let matches = best_matches(bad, names.iter().copied());
    if let Some((best, _)) = matches.first() {
        debug!(from = %bad, to = %best, "fuzzy table repair");
        return replace_token(query, bad, best);
    }
    query.to_string()
}

fn fix_unknown_column(query: &str, token: &str, catalog: &Catalog) -> String {
    let (table_hint, column) = match token.split_once('.') {
        Some((table, column)) => (Some(table), column),
        None => (None, token),
    };

    // Domain repair: patient identifier spelled as the foreign key
    if column.eq_ignore_ascii_case("patient_id") {
        if table_hint.is_some_and(|t| t.eq_ignore_ascii_case("patients")) {
            return replace_token(query, token, "patients.id");
        }
        if table_hint.is_none() {
            let refs = extract_references(query);
            if refs.tables.len() == 1 && refs.tables.contains("patients") {
                return replace_token(query, column, "id");
            }
        }
    }

    // Domain repair: the alternate date-field spelling in a time-series
    // context maps to the canonical date column
    if column.eq_ignore_ascii_case("visit_date") && in_time_series_context(query) {
        return replace_token(query, column, "date");
    }

    // Fuzzy: within the hinted table, or the first table yielding a match
    if let Some(hint) = table_hint {
        if let Some(table) = catalog.table(hint) {
            let columns = table.column_names();
            let matches = best_matches(column, columns.iter().copied());
            if let Some((best, _)) = matches.first() {
                debug!(from = %column, to = %best, table = %hint, "fuzzy column repair");
                return replace_token(query, column, best);
            }
        }
        return query.to_string();
    }

    for table in &catalog.tables {
        let columns = table.column_names();
        let matches = best_matches(column, columns.iter().copied());
        if let Some((best, _)) = matches.first() {
            debug!(from = %column, to = %best, table = %table.name, "fuzzy column repair");
            return replace_token(query, column, best);
        }
    }
    query.to_string()
}

/// Whether the query reads like a time series: grouped, ordered, or
/// windowed with BETWEEN
fn in_time_series_context(query: &str) -> bool {
    let lower = query.to_lowercase();
    lower.contains("group by") || lower.contains("order by") || lower.contains("between")
}

/// Replace every standalone occurrence of a token, case-insensitively.
/// Word-boundary guarded: never rewrites inside compound or longer
/// tokens.
fn replace_token(text: &str, token: &str, replacement: &str) -> String {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(token));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, replacement).into_owned(),
        Err(_) => text.to_string(),
    }
}
