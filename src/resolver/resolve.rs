//! Field resolution against the catalog

use crate::catalog::Catalog;

/// The outcome of resolving a field name
///
/// `Unresolved` is an explicit outcome, not an error: callers decide
/// whether to degrade (the clause builder emits the bare name) or abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Resolved {
        /// The canonical field name, after alias resolution
        field: &'a str,
        /// The owning table
        table: &'a str,
    },
    Unresolved,
}

impl<'a> Resolution<'a> {
    /// The `table.field` reference, if resolved
    pub fn qualified(&self) -> Option<String> {
        match self {
            Resolution::Resolved { field, table } => Some(format!("{}.{}", table, field)),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

/// Resolve a field name to its canonical form and owning table
///
/// Case-insensitive. Alias lookup precedes ownership lookup, and alias
/// resolution is a single hop: the alias target is expected to be a
/// canonical field, never another alias. Pure function of the catalog.
pub fn resolve_field<'a>(catalog: &'a Catalog, name: &str) -> Resolution<'a> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Resolution::Unresolved;
    }

    // Alias first, then ownership
    let canonical = catalog.canonical_field(trimmed).unwrap_or(trimmed);

    match catalog.owner_entry(canonical) {
        Some((field, table)) => Resolution::Resolved { field, table },
        None => Resolution::Unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_test_catalog() -> Catalog {
        Catalog::from_file("test_data/clinic.yaml").unwrap()
    }

    #[test]
    fn test_resolve_canonical_field() {
        let catalog = load_test_catalog();
        let res = resolve_field(&catalog, "weight");
        assert_eq!(res, Resolution::Resolved { field: "weight", table: "vitals" });
        assert_eq!(res.qualified().as_deref(), Some("vitals.weight"));
    }

    #[test]
    fn test_resolve_via_alias() {
        let catalog = load_test_catalog();
        assert_eq!(
            resolve_field(&catalog, "sex"),
            Resolution::Resolved { field: "gender", table: "patients" }
        );
        assert_eq!(
            resolve_field(&catalog, "status"),
            Resolution::Resolved { field: "active", table: "patients" }
        );
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let catalog = load_test_catalog();
        assert_eq!(
            resolve_field(&catalog, "BMI"),
            Resolution::Resolved { field: "bmi", table: "vitals" }
        );
        assert_eq!(
            resolve_field(&catalog, "Sex"),
            Resolution::Resolved { field: "gender", table: "patients" }
        );
    }

    #[test]
    fn test_resolve_unknown_field() {
        let catalog = load_test_catalog();
        assert_eq!(resolve_field(&catalog, "cholesterol"), Resolution::Unresolved);
        assert_eq!(resolve_field(&catalog, ""), Resolution::Unresolved);
        assert_eq!(resolve_field(&catalog, "  "), Resolution::Unresolved);
    }
}
