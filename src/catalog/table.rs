//! Table, column, and relationship definitions

use serde::{Deserialize, Serialize};
use super::types::DataType;

/// A physical table known to the catalog
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

/// A column within a table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: DataType,
}

/// A join relationship between an observation table and the table it references
///
/// Read as: `<table>.<column> = <references>.<ref_column>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JoinDef {
    pub table: String,
    pub column: String,
    pub references: String,
    #[serde(rename = "ref_column")]
    pub ref_column: String,
}

impl TableDef {
    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Check whether the table has a column (case-insensitive)
    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// All column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The first date-like column, if the table has one
    pub fn date_column(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.data_type.is_date_like())
            .map(|c| c.name.as_str())
    }
}

impl JoinDef {
    /// Render the join condition (`vitals.patient_id = patients.id`)
    pub fn condition(&self) -> String {
        format!(
            "{}.{} = {}.{}",
            self.table, self.column, self.references, self.ref_column
        )
    }
}
