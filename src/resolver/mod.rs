//! Field resolver (verb module)
//!
//! Canonical field ↔ table mapping with alias resolution.

mod resolve;

pub use resolve::{resolve_field, Resolution};
