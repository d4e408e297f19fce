//! Root schema catalog definition

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use super::table::{JoinDef, TableDef};
use super::types::DataType;
use crate::error::ParseError;

/// The schema catalog: the authoritative description of the database
///
/// Loaded once at process start and treated as read-only. Hot reloads are
/// performed by the caller as an atomic swap of the whole catalog, so
/// in-flight requests observe either the old or the new catalog entirely.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Catalog {
    pub tables: Vec<TableDef>,
    /// Alternate field name → canonical field name (single hop, no chains)
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Canonical field name → owning table
    #[serde(default)]
    pub field_owners: HashMap<String, String>,
    /// Join relationships between tables
    #[serde(default)]
    pub relationships: Vec<JoinDef>,
}

impl Catalog {
    /// Load a catalog from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let path_str = path.as_ref().display().to_string();
        let contents = std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
            path: path_str,
            source: e,
        })?;
        Self::from_yaml(&contents)
    }

    /// Load a catalog from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ParseError> {
        serde_yaml::from_str(yaml).map_err(ParseError::from)
    }

    /// Get a table by name (case-insensitive)
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Check whether a table exists (case-insensitive)
    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// All table names in declaration order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Check whether any table has the given column
    pub fn any_table_has_column(&self, column: &str) -> bool {
        self.tables.iter().any(|t| t.has_column(column))
    }

    /// The type of `table.column`, if both exist
    pub fn column_type(&self, table: &str, column: &str) -> Option<DataType> {
        self.table(table)?.get_column(column).map(|c| c.data_type)
    }

    /// Resolve an alias to its canonical field name (case-insensitive, one hop)
    pub fn canonical_field(&self, name: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, canonical)| canonical.as_str())
    }

    /// The owning table of a canonical field (case-insensitive)
    pub fn owner_of(&self, field: &str) -> Option<&str> {
        self.owner_entry(field).map(|(_, table)| table)
    }

    /// The ownership entry for a canonical field, in the catalog's own
    /// spelling (case-insensitive lookup)
    pub fn owner_entry(&self, field: &str) -> Option<(&str, &str)> {
        self.field_owners
            .iter()
            .find(|(f, _)| f.eq_ignore_ascii_case(field))
            .map(|(f, table)| (f.as_str(), table.as_str()))
    }

    /// The relationship joining `table` to the table it references
    pub fn relationship_of(&self, table: &str) -> Option<&JoinDef> {
        self.relationships
            .iter()
            .find(|j| j.table.eq_ignore_ascii_case(table))
    }

    /// Check whether a table is an observation table: related to another
    /// table and carrying a `date` column. Relative-change analysis is
    /// only supported for metrics owned by observation tables.
    pub fn is_observation_table(&self, table: &str) -> bool {
        self.relationship_of(table).is_some()
            && self
                .table(table)
                .map(|t| t.get_column("date").map(|c| c.data_type.is_date_like()).unwrap_or(false))
                .unwrap_or(false)
    }

    /// Known singular forms of table names, paired with their canonical
    /// plural. Derived from table names ending in `s`; used by the
    /// deterministic plural-normalization rewrite.
    pub fn singular_forms(&self) -> Vec<(String, &str)> {
        self.tables
            .iter()
            .filter_map(|t| {
                let name = t.name.as_str();
                name.strip_suffix('s').and_then(|singular| {
                    if singular.is_empty() {
                        None
                    } else {
                        Some((singular.to_string(), name))
                    }
                })
            })
            .collect()
    }
}
