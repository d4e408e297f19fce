//! clinquery - Compile clinical analysis intents to SQL and analysis artifacts
//!
//! This library provides:
//! - Schema catalog types (Catalog, TableDef, ColumnDef, DataType)
//! - Catalog loading from YAML
//! - Field resolution (canonical field ↔ owning table, alias handling)
//! - Predicate construction from intent filters and time ranges
//! - Analysis artifact generation, one strategy per analysis kind
//! - Reference extraction and schema validation/repair for query text
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `catalog/` - the schema catalog (tables, columns, aliases, ownership)
//! - `intent/` - analysis request types (Intent, AnalysisKind, Filter)
//! - `artifact/` - generated output (Artifact) and the runner contract
//!
//! **Verb modules** (transformations):
//! - `resolver/` - Catalog + field name → (canonical field, owning table)
//! - `predicate/` - Catalog + Intent → WHERE-clause body
//! - `generator/` - Catalog + Intent → Artifact
//! - `extractor/` - query text → referenced {tables, columns}
//! - `validator/` - references + Catalog → ValidationResult, with repair
//!
//! # Example
//!
//! ```ignore
//! use clinquery::{generate, validate_and_repair, Catalog, Intent};
//!
//! let catalog = Catalog::from_file("clinic.yaml")?;
//! let intent: Intent = serde_json::from_str(request_body)?;
//! let artifact = generate(&catalog, &intent);
//! let (query, validation) = validate_and_repair(&artifact.query, &catalog);
//! ```

pub mod artifact;
pub mod catalog;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod intent;
pub mod predicate;
pub mod resolver;
pub mod validator;

// Re-export commonly used types
pub use artifact::Artifact;
pub use catalog::{Catalog, ColumnDef, DataType, JoinDef, TableDef};
pub use error::ParseError;
pub use extractor::{extract_references, References};
pub use generator::{generate, DEFAULT_METRIC};
pub use intent::{AnalysisKind, Condition, Filter, Intent, TimeRange, TimeValue};
pub use predicate::build_predicate;
pub use resolver::{resolve_field, Resolution};
pub use validator::{
    attempt_fix, normalize_table_names, validate, validate_and_repair, validate_with_dry_run,
    ValidationResult,
};
