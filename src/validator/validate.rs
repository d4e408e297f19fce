//! Query validation against the catalog

use std::collections::BTreeSet;
use tracing::debug;

use crate::catalog::Catalog;
use crate::extractor::extract_references;

/// The outcome of validating a query's schema references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub unknown_tables: BTreeSet<String>,
    pub unknown_columns: BTreeSet<String>,
    /// Diagnostic message; parseable by the repair engine
    pub message: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        ValidationResult {
            valid: true,
            ..Default::default()
        }
    }
}

/// Validate a query's table and column references against the catalog
pub fn validate(query: &str, catalog: &Catalog) -> ValidationResult {
    let refs = extract_references(query);

    let unknown_tables: BTreeSet<String> = refs
        .tables
        .iter()
        .filter(|t| !catalog.has_table(t.as_str()))
        .cloned()
        .collect();

    let unknown_columns: BTreeSet<String> = refs
        .columns
        .iter()
        .filter(|c| !catalog.any_table_has_column(c.as_str()))
        .cloned()
        .collect();

    if unknown_tables.is_empty() && unknown_columns.is_empty() {
        return ValidationResult::ok();
    }

    let mut parts: Vec<String> = Vec::new();
    for table in &unknown_tables {
        parts.push(format!("unknown table: {}", table));
    }
    for column in &unknown_columns {
        parts.push(format!("unknown column: {}", column));
    }
    let message = parts.join("; ");
    debug!(%message, "query failed schema validation");

    ValidationResult {
        valid: false,
        unknown_tables,
        unknown_columns,
        message: Some(message),
    }
}

/// Validate structurally, then hand the query to an external dry-run
/// capability (a non-mutating plan/compile check against the live
/// database)
pub fn validate_with_dry_run<F>(query: &str, catalog: &Catalog, dry_run: F) -> ValidationResult
where
    F: Fn(&str) -> Result<(), String>,
{
    let result = validate(query, catalog);
    if !result.valid {
        return result;
    }

    match dry_run(query) {
        Ok(()) => result,
        Err(error) => {
            debug!(%error, "dry run rejected query");
            ValidationResult {
                valid: false,
                message: Some(error),
                ..Default::default()
            }
        }
    }
}
