//! Reference extractor (verb module)
//!
//! Recovers the tables and columns a query string references, so the
//! validator can check them against the catalog.

mod extract;

pub use extract::{extract_references, References};
