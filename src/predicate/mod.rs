//! Filter clause builder (verb module)
//!
//! Turns intent filters, conditions, and time ranges into a query
//! predicate, routing fields through the resolver.

mod build;

pub use build::{build_predicate, render_value};
