//! Integration tests for validation and repair

mod common;

use clinquery::{attempt_fix, normalize_table_names, validate, validate_and_repair};
use common::load_catalog;

#[test]
fn test_repair_fixed_point() {
    let catalog = load_catalog();
    let query = "SELECT weight FROM vital WHERE vital.bmi > 25";
    let error = "unknown table: vital";

    let once = attempt_fix(query, error, &catalog).expect("first application should rewrite");
    let again = attempt_fix(&once, error, &catalog);
    assert_eq!(again, None, "second application must be a no-op");
}

#[test]
fn test_plural_normalization_order_independent() {
    let catalog = load_catalog();
    let query = "SELECT vital.weight FROM vital JOIN patient ON vital.patient_id = patient.id";

    let normalized = normalize_table_names(query, &catalog);
    assert_eq!(
        normalized,
        "SELECT vitals.weight FROM vitals JOIN patients ON vitals.patient_id = patients.id"
    );

    // Idempotent: a second pass changes nothing
    assert_eq!(normalize_table_names(&normalized, &catalog), normalized);
}

#[test]
fn test_singular_repair_rewrites_all_standalone_occurrences() {
    let catalog = load_catalog();
    let query = "SELECT patient.gender FROM patient \
                 JOIN patients ON patient.id = patients.id \
                 WHERE patient.active = 1";

    let revised = attempt_fix(query, "unknown table: patient", &catalog)
        .expect("repair should rewrite the singular form");

    assert_eq!(
        revised,
        "SELECT patients.gender FROM patients \
         JOIN patients ON patients.id = patients.id \
         WHERE patients.active = 1"
    );
    // Compound tokens stay untouched
    let compound = attempt_fix(
        "SELECT patient_id FROM vitals",
        "unknown table: patient",
        &catalog,
    );
    assert_eq!(compound, None);
}

#[test]
fn test_externally_produced_query_round_trip() {
    let catalog = load_catalog();

    // The shape of a query an external generator gets wrong in two ways:
    // a singular table and a misspelled column
    let (revised, result) = validate_and_repair("SELECT wieght FROM vitals", &catalog);
    assert_eq!(revised, "SELECT weight FROM vitals");
    assert!(result.valid);

    let (revised, result) = validate_and_repair(
        "SELECT weight FROM vital WHERE vital.bmi > 25",
        &catalog,
    );
    assert_eq!(revised, "SELECT weight FROM vitals WHERE vitals.bmi > 25");
    assert!(result.valid);
}

#[test]
fn test_validation_reports_unknowns() {
    let catalog = load_catalog();
    let result = validate("SELECT wieght FROM visits", &catalog);

    assert!(!result.valid);
    assert!(result.unknown_tables.contains("visits"));
    assert!(result.unknown_columns.contains("wieght"));
    let message = result.message.expect("diagnostic message");
    assert!(message.contains("unknown table: visits"));
    assert!(message.contains("unknown column: wieght"));
}

#[test]
fn test_repair_never_produces_malformed_output() {
    let catalog = load_catalog();

    // The fuzzy layer is heuristic: assert shape preservation, not
    // semantic correctness
    let inputs = [
        ("SELECT wieght FROM vitals", "unknown column: wieght"),
        ("SELECT x FROM pateints", "unknown table: pateints"),
        ("SELECT weight FROM vitals", "unknown table: vitals"),
        ("", "unknown table: vitals"),
        ("SELECT weight FROM vitals", ""),
    ];

    for (query, error) in inputs {
        let revised = attempt_fix(query, error, &catalog).unwrap_or_else(|| query.to_string());
        // Same statement structure: keyword counts preserved
        assert_eq!(
            query.to_lowercase().matches("select").count(),
            revised.to_lowercase().matches("select").count()
        );
        assert_eq!(
            query.to_lowercase().matches("from").count(),
            revised.to_lowercase().matches("from").count()
        );
    }
}

#[test]
fn test_domain_repairs() {
    let catalog = load_catalog();

    let revised = attempt_fix(
        "SELECT patients.patient_id, patients.gender FROM patients",
        "unknown column: patients.patient_id",
        &catalog,
    )
    .expect("identifier repair should apply");
    assert_eq!(revised, "SELECT patients.id, patients.gender FROM patients");

    let revised = attempt_fix(
        "SELECT visit_date, weight FROM vitals GROUP BY visit_date",
        "unknown column: visit_date",
        &catalog,
    )
    .expect("date-field repair should apply");
    assert_eq!(revised, "SELECT date, weight FROM vitals GROUP BY date");
}
