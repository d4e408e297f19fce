//! Select-statement assembly with conditional joins

use tracing::warn;

use crate::catalog::Catalog;
use crate::resolver::{resolve_field, Resolution};

/// One item in a SELECT list
#[derive(Debug, Clone)]
pub struct SelectItem {
    /// Owning table; None for fields the resolver could not place
    pub table: Option<String>,
    pub column: String,
    pub alias: Option<String>,
}

impl SelectItem {
    fn render(&self) -> String {
        let reference = match &self.table {
            Some(table) => format!("{}.{}", table, self.column),
            None => self.column.clone(),
        };
        match &self.alias {
            Some(alias) => format!("{} AS {}", reference, alias),
            None => reference,
        }
    }
}

/// Locate a field: owning table and canonical column when resolvable,
/// otherwise the bare name (emitted unqualified, the documented
/// degradation for unresolvable references)
pub fn locate(catalog: &Catalog, name: &str) -> SelectItem {
    match resolve_field(catalog, name) {
        Resolution::Resolved { field, table } => SelectItem {
            table: Some(table.to_string()),
            column: field.to_string(),
            alias: None,
        },
        Resolution::Unresolved => {
            warn!(field = name, "field not in catalog, selecting unqualified");
            SelectItem {
                table: None,
                column: name.trim().to_string(),
                alias: None,
            }
        }
    }
}

/// Assemble a SELECT over the primary table, joining in every other table
/// the select list references. Cross-table routing goes through the hub
/// table the relationships reference (observation tables join the patient
/// table on patient identity).
pub fn build_select(
    catalog: &Catalog,
    primary: &str,
    items: &[SelectItem],
    predicate: &str,
) -> String {
    let mut joined: Vec<String> = vec![primary.to_string()];
    let mut joins: Vec<String> = Vec::new();

    for item in items {
        if let Some(table) = &item.table {
            add_join(catalog, &mut joined, &mut joins, table);
        }
    }

    let columns: Vec<String> = items.iter().map(|i| i.render()).collect();
    let mut query = format!("SELECT {} FROM {}", columns.join(", "), primary);
    for join in &joins {
        query.push(' ');
        query.push_str(join);
    }
    if !predicate.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(predicate);
    }
    query
}

fn is_joined(joined: &[String], table: &str) -> bool {
    joined.iter().any(|j| j.eq_ignore_ascii_case(table))
}

/// Join `table` into the query if it is not already reachable
fn add_join(catalog: &Catalog, joined: &mut Vec<String>, joins: &mut Vec<String>, table: &str) {
    if is_joined(joined, table) {
        return;
    }

    let primary = joined[0].clone();

    // The table references the hub directly (vitals → patients)
    if let Some(rel) = catalog.relationship_of(table) {
        if !is_joined(joined, &rel.references) {
            // Bring the hub in through the primary table's own relationship
            if let Some(primary_rel) = catalog.relationship_of(&primary) {
                if primary_rel.references.eq_ignore_ascii_case(&rel.references) {
                    joins.push(format!(
                        "JOIN {} ON {}",
                        primary_rel.references,
                        primary_rel.condition()
                    ));
                    joined.push(primary_rel.references.clone());
                }
            }
        }
        if is_joined(joined, &rel.references) {
            joins.push(format!("JOIN {} ON {}", table, rel.condition()));
            joined.push(table.to_string());
            return;
        }
    }

    // The table is the hub the primary references (patients from vitals)
    if let Some(primary_rel) = catalog.relationship_of(&primary) {
        if primary_rel.references.eq_ignore_ascii_case(table) {
            joins.push(format!("JOIN {} ON {}", table, primary_rel.condition()));
            joined.push(table.to_string());
            return;
        }
    }

    warn!(from = %primary, to = %table, "no join path between tables, leaving unjoined");
}
