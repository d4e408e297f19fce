//! Predicate construction from intent filters, conditions, and time range

use serde_json::Value;
use tracing::warn;

use crate::catalog::Catalog;
use crate::intent::{Condition, Filter, Intent};
use crate::resolver::{resolve_field, Resolution};

/// Build the WHERE-clause body for an intent
///
/// Returns the predicate text with no leading keyword; the caller supplies
/// `WHERE` (or `AND`) when composing the query. Returns the empty string
/// when nothing applies. Fragments are joined with `AND`.
pub fn build_predicate(catalog: &Catalog, intent: &Intent) -> String {
    let mut fragments: Vec<String> = Vec::new();

    if let Some(range) = &intent.time_range {
        let anchor = time_anchor(catalog, intent);
        fragments.push(format!(
            "{} BETWEEN '{}' AND '{}'",
            anchor,
            escape(&range.start.render()),
            escape(&range.end.render()),
        ));
    }

    for filter in &intent.filters {
        if let Some(fragment) = filter_fragment(catalog, filter) {
            fragments.push(fragment);
        }
    }

    for condition in &intent.conditions {
        if let Some(fragment) = condition_fragment(catalog, condition) {
            fragments.push(fragment);
        }
    }

    fragments.join(" AND ")
}

/// The date column the global time range constrains: the date column of
/// the target metric's owning table, falling back to the bare `date`
/// token when nothing resolves.
fn time_anchor(catalog: &Catalog, intent: &Intent) -> String {
    let metric = intent
        .target_field
        .as_deref()
        .or_else(|| intent.fields.first().map(|f| f.as_str()))
        .unwrap_or(crate::generator::DEFAULT_METRIC);

    if let Resolution::Resolved { table, .. } = resolve_field(catalog, metric) {
        if let Some(date_col) = catalog.table(table).and_then(|t| t.date_column()) {
            return format!("{}.{}", table, date_col);
        }
        // Owner has no date column of its own: constrain the related
        // observation side if one exists
        if let Some(join) = catalog
            .relationships
            .iter()
            .find(|j| j.references.eq_ignore_ascii_case(table))
        {
            if let Some(date_col) = catalog.table(&join.table).and_then(|t| t.date_column()) {
                return format!("{}.{}", join.table, date_col);
            }
        }
    }
    "date".to_string()
}

/// One predicate fragment for a filter, or None when the filter is
/// incomplete (a range missing a bound is silently omitted by contract).
fn filter_fragment(catalog: &Catalog, filter: &Filter) -> Option<String> {
    let reference = field_reference(catalog, &filter.field)?;

    if let Some(value) = &filter.value {
        let rendered = scalar_filter_value(catalog, &filter.field, value);
        return Some(format!("{} = {}", reference, rendered));
    }

    if let Some(range) = &filter.range {
        // BETWEEN only when both bounds are present
        let (Some(start), Some(end)) = (range.start, range.end) else {
            return None;
        };
        return Some(format!("{} BETWEEN {} AND {}", reference, start, end));
    }

    if let Some(range) = &filter.date_range {
        let (Some(start), Some(end)) = (&range.start, &range.end) else {
            return None;
        };
        let reference = date_reference(catalog, &filter.field, &reference);
        return Some(format!(
            "{} BETWEEN '{}' AND '{}'",
            reference,
            escape(&start.render()),
            escape(&end.render()),
        ));
    }

    None
}

/// One predicate fragment for a condition
fn condition_fragment(catalog: &Catalog, condition: &Condition) -> Option<String> {
    let reference = field_reference(catalog, &condition.field)?;

    match condition.operator.trim().to_lowercase().as_str() {
        "between" => {
            let Value::Array(bounds) = &condition.value else {
                return None;
            };
            if bounds.len() != 2 {
                return None;
            }
            Some(format!(
                "{} BETWEEN {} AND {}",
                reference,
                render_value(&bounds[0]),
                render_value(&bounds[1]),
            ))
        }
        "in" => {
            let Value::Array(values) = &condition.value else {
                return None;
            };
            let rendered: Vec<String> = values.iter().map(render_value).collect();
            Some(format!("{} IN ({})", reference, rendered.join(", ")))
        }
        op @ ("=" | "==" | "!=" | "<>" | ">" | ">=" | "<" | "<=" | "like") => {
            let op = if op == "==" { "=" } else { op };
            let op = if op == "like" { "LIKE" } else { op };
            Some(format!("{} {} {}", reference, op, render_value(&condition.value)))
        }
        other => {
            // Operators are structural tokens; anything off the allow-list
            // degrades to equality
            warn!(operator = other, field = %condition.field, "unknown condition operator, using =");
            Some(format!("{} = {}", reference, render_value(&condition.value)))
        }
    }
}

/// Qualified `table.field` reference, or the bare field when unresolved.
/// Bare fields must look like identifiers; anything else is dropped.
fn field_reference(catalog: &Catalog, field: &str) -> Option<String> {
    let resolution = resolve_field(catalog, field);
    if let Some(qualified) = resolution.qualified() {
        return Some(qualified);
    }

    let bare = field.trim();
    if is_identifier(bare) {
        warn!(field = bare, "field not in catalog, emitting unqualified");
        Some(bare.to_string())
    } else {
        warn!(field = bare, "field is not a valid identifier, dropping filter");
        None
    }
}

/// The reference a date-range filter constrains: the field itself when it
/// is a date-like column, otherwise the owning table's `date` column.
fn date_reference(catalog: &Catalog, field: &str, fallback: &str) -> String {
    if let Resolution::Resolved { field, table } = resolve_field(catalog, field) {
        let is_date = catalog
            .column_type(table, field)
            .map(|t| t.is_date_like())
            .unwrap_or(false);
        if is_date {
            return format!("{}.{}", table, field);
        }
        return format!("{}.date", table);
    }
    fallback.to_string()
}

/// Render a scalar filter value, applying the active-status mapping
///
/// The `active` flag is stored as 1/0; intents frequently say
/// "active"/"inactive", which map accordingly. Other values pass through
/// the normal quoting rules.
fn scalar_filter_value(catalog: &Catalog, field: &str, value: &Value) -> String {
    if let Resolution::Resolved { field: canonical, .. } = resolve_field(catalog, field) {
        if canonical.eq_ignore_ascii_case("active") {
            if let Value::String(s) = value {
                match s.to_lowercase().as_str() {
                    "active" => return "1".to_string(),
                    "inactive" => return "0".to_string(),
                    _ => {}
                }
            }
        }
    }
    render_value(value)
}

/// Render a value for embedding: numbers and booleans unquoted, strings
/// single-quoted with `''` escaping, null as NULL
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::String(s) => format!("'{}'", escape(s)),
        Value::Null => "NULL".to_string(),
        other => format!("'{}'", escape(&other.to_string())),
    }
}

fn escape(s: &str) -> String {
    s.replace('\'', "''")
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
