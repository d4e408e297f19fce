//! Integration tests for reference extraction

use clinquery::extract_references;

#[test]
fn test_aliased_filtered_grouped_query() {
    // One column selected from one table, filtered and grouped by two
    // other columns, with the table joined under an alias: exactly the
    // one table name and every referenced column must come back
    let refs = extract_references(
        "SELECT v.weight FROM vitals AS v \
         WHERE v.bmi > 25 \
         GROUP BY v.gender, v.age",
    );

    assert_eq!(refs.tables.len(), 1);
    assert!(refs.tables.contains("vitals"));

    let columns: Vec<&str> = refs.columns.iter().map(|c| c.as_str()).collect();
    assert_eq!(columns, vec!["age", "bmi", "gender", "weight"]);
}

#[test]
fn test_multi_table_join_references() {
    let refs = extract_references(
        "SELECT patients.gender, AVG(vitals.bmi) FROM vitals \
         JOIN patients ON vitals.patient_id = patients.id \
         WHERE patients.active = 1 \
         GROUP BY patients.gender \
         ORDER BY patients.gender",
    );

    assert_eq!(refs.tables.len(), 2);
    assert!(refs.tables.contains("patients"));
    assert!(refs.tables.contains("vitals"));
    for column in ["gender", "bmi", "patient_id", "id", "active"] {
        assert!(refs.columns.contains(column), "missing {}", column);
    }
}

#[test]
fn test_aggregates_and_wildcards() {
    let refs = extract_references("SELECT COUNT(*), MAX(weight) FROM vitals");
    assert!(refs.tables.contains("vitals"));
    assert_eq!(refs.columns.len(), 1);
    assert!(refs.columns.contains("weight"));
}

#[test]
fn test_extraction_is_case_insensitive() {
    let upper = extract_references("SELECT WEIGHT FROM VITALS WHERE BMI > 20");
    let lower = extract_references("select weight from vitals where bmi > 20");
    assert_eq!(upper, lower);
}
