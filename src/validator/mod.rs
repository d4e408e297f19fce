//! Schema validator and repair engine (verb module)
//!
//! Checks extracted query references against the catalog, and repairs
//! common schema-reference errors through deterministic rewrites and
//! fuzzy name matching. Repair is best-effort and never fails; the
//! contract is that it never produces malformed output, not that every
//! fix is the intended one.

mod fuzzy;
mod repair;
mod validate;

pub use fuzzy::{best_matches, similarity, MAX_CANDIDATES, MIN_SIMILARITY};
pub use repair::{attempt_fix, normalize_table_names, validate_and_repair};
pub use validate::{validate, validate_with_dry_run, ValidationResult};
