//! Integration tests for building and validating partner forests from JSON

use rstest::rstest;
use serde_json::{json, Value};

use commission_engine::domain::{DomainError, ForestBuilder, ForestValidator};

fn build_and_validate(data: &Value) -> Result<usize, DomainError> {
    let forest = ForestBuilder::new().build_from_json(data)?;
    let forest = ForestValidator::new().validate(forest)?;
    Ok(forest.len())
}

// ============================================================
// Input shape
// ============================================================

#[rstest]
#[case::object(json!({"id": 1}))]
#[case::string(json!("partners"))]
#[case::number(json!(42))]
fn given_non_list_input_when_building_then_invalid_type(#[case] data: Value) {
    let err = build_and_validate(&data).unwrap_err();
    assert!(matches!(err, DomainError::InvalidType { .. }), "{:?}", err);
}

#[test]
fn given_empty_list_when_building_then_validation_error() {
    let err = build_and_validate(&json!([])).unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[test]
fn given_non_object_record_when_building_then_invalid_type() {
    let err = build_and_validate(&json!([{"id": 1, "monthly_revenue": 1}, 7])).unwrap_err();
    assert!(matches!(err, DomainError::InvalidType { .. }));
}

#[rstest]
#[case::missing_id(json!([{"monthly_revenue": 1}]))]
#[case::missing_revenue(json!([{"id": 1}]))]
#[case::string_id(json!([{"id": "1", "monthly_revenue": 1}]))]
#[case::string_revenue(json!([{"id": 1, "monthly_revenue": "1"}]))]
#[case::negative_revenue(json!([{"id": 1, "monthly_revenue": -5}]))]
#[case::string_parent(json!([
    {"id": 1, "monthly_revenue": 1},
    {"id": 2, "parent_id": "1", "monthly_revenue": 1}
]))]
fn given_malformed_record_when_building_then_validation_error(#[case] data: Value) {
    let err = build_and_validate(&data).unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)), "{:?}", err);
}

#[test]
fn given_non_string_name_when_building_then_invalid_type() {
    let err = build_and_validate(&json!([{"id": 1, "name": 5, "monthly_revenue": 1}])).unwrap_err();
    assert!(matches!(err, DomainError::InvalidType { .. }));
}

#[test]
fn given_null_parent_and_missing_name_when_building_then_accepted() {
    let data = json!([
        {"id": 1, "parent_id": null, "monthly_revenue": 0},
        {"id": 2, "parent_id": 1, "monthly_revenue": 12.5},
    ]);
    assert_eq!(build_and_validate(&data).unwrap(), 2);
}

// ============================================================
// Structure
// ============================================================

#[test]
fn given_duplicate_id_when_building_then_rejected_with_position() {
    let data = json!([
        {"id": 1, "monthly_revenue": 0},
        {"id": 1, "monthly_revenue": 0},
    ]);
    assert_eq!(
        build_and_validate(&data).unwrap_err(),
        DomainError::DuplicateId { id: 1, index: 1 }
    );
}

#[test]
fn given_two_node_cycle_when_validating_then_cycle_detected() {
    // Arrange
    let data = json!([
        {"id": 1, "parent_id": 2, "monthly_revenue": 0},
        {"id": 2, "parent_id": 1, "monthly_revenue": 0},
    ]);

    // Act
    let err = build_and_validate(&data).unwrap_err();

    // Assert
    assert!(
        matches!(err, DomainError::CycleDetected(1) | DomainError::CycleDetected(2)),
        "{:?}",
        err
    );
}

#[test]
fn given_cycle_beside_valid_tree_when_validating_then_cycle_wins_over_roots() {
    let data = json!([
        {"id": 1, "monthly_revenue": 0},
        {"id": 2, "parent_id": 1, "monthly_revenue": 0},
        {"id": 3, "parent_id": 4, "monthly_revenue": 0},
        {"id": 4, "parent_id": 3, "monthly_revenue": 0},
    ]);
    let err = build_and_validate(&data).unwrap_err();
    assert!(matches!(err, DomainError::CycleDetected(_)));
}

#[test]
fn given_parents_listed_after_children_when_building_then_links_resolve() {
    let data = json!([
        {"id": 3, "parent_id": 2, "monthly_revenue": 0},
        {"id": 2, "parent_id": 1, "monthly_revenue": 0},
        {"id": 1, "monthly_revenue": 0},
    ]);

    let forest = ForestBuilder::new().build_from_json(&data).unwrap();

    assert_eq!(forest.roots().len(), 1);
    let depths: Vec<(i64, usize)> = forest
        .iter()
        .map(|(_, node, depth)| (node.data.id, depth))
        .collect();
    assert_eq!(depths, vec![(1, 0), (2, 1), (3, 2)]);
}
