//! Shared test utilities for integration tests

use clinquery::Catalog;

/// Load the clinic catalog fixture from the tests/test_data directory
pub fn load_catalog() -> Catalog {
    let path = "tests/test_data/clinic.yaml";
    Catalog::from_file(path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", path, e))
}
