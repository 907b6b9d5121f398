//! End-to-end commission scenarios through the whole pipeline.
//!
//! All scenarios use January 2024 (31 days), so a monthly revenue of
//! 3100 is a daily profit of 100.

use chrono::NaiveDate;
use rstest::rstest;
use serde_json::{json, Value};

use commission_engine::application::ApplicationError;
use commission_engine::domain::{
    round_currency, CommissionCalculator, DailyProfitCalculator, ForestBuilder, ForestValidator,
};
use commission_engine::util::testing::{chain_records, init_test_setup};
use commission_engine::{calculate_commissions, DomainError, COMMISSION_RATE};

fn january() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 1, 15)
}

fn commissions_for(data: &Value) -> Vec<(String, f64)> {
    calculate_commissions(data, january())
        .expect("pipeline succeeds")
        .commissions
        .into_iter()
        .collect()
}

fn domain_error(result: Result<impl std::fmt::Debug, ApplicationError>) -> DomainError {
    match result {
        Err(ApplicationError::Domain(e)) => e,
        other => panic!("expected domain error, got {:?}", other),
    }
}

// ============================================================
// Concrete scenarios
// ============================================================

#[test]
fn given_root_and_child_when_calculating_then_root_earns_on_child_profit() {
    init_test_setup();
    // Arrange
    let data = json!([
        {"id": 1, "name": "Alice", "monthly_revenue": 3100},
        {"id": 2, "parent_id": 1, "name": "Bob", "monthly_revenue": 1550},
    ]);

    // Act
    let report = calculate_commissions(&data, january()).unwrap();

    // Assert
    assert_eq!(report.days_in_month, 31);
    assert_eq!(report.commissions["1"], 2.5);
    assert_eq!(report.commissions["2"], 0.0);
}

#[test]
fn given_three_level_chain_when_calculating_then_each_earns_on_descendants() {
    let data = json!([
        {"id": 1, "monthly_revenue": 3100},
        {"id": 2, "parent_id": 1, "monthly_revenue": 1550},
        {"id": 3, "parent_id": 2, "monthly_revenue": 620},
    ]);

    let result = commissions_for(&data);

    assert_eq!(
        result,
        vec![
            ("1".to_string(), 3.5),
            ("2".to_string(), 1.0),
            ("3".to_string(), 0.0)
        ]
    );
}

#[test]
fn given_root_with_three_children_when_calculating_then_root_earns_on_all() {
    let data = json!([
        {"id": 1, "monthly_revenue": 0},
        {"id": 2, "parent_id": 1, "monthly_revenue": 1550},
        {"id": 3, "parent_id": 1, "monthly_revenue": 930},
        {"id": 4, "parent_id": 1, "monthly_revenue": 620},
    ]);

    let report = calculate_commissions(&data, january()).unwrap();

    assert_eq!(report.commissions["1"], 5.0);
    for id in ["2", "3", "4"] {
        assert_eq!(report.commissions[id], 0.0, "child {} is a leaf", id);
    }
}

#[test]
fn given_self_reference_when_calculating_then_cycle_detected() {
    let data = json!([{"id": 1, "parent_id": 1, "monthly_revenue": 100}]);

    let err = domain_error(calculate_commissions(&data, january()));

    assert_eq!(err, DomainError::CycleDetected(1));
}

#[test]
fn given_missing_parent_when_calculating_then_error_names_both_ids() {
    let data = json!([{"id": 1, "parent_id": 999, "monthly_revenue": 100}]);

    let err = domain_error(calculate_commissions(&data, january()));

    assert_eq!(
        err,
        DomainError::ParentNotFound {
            parent_id: 999,
            partner_id: 1
        }
    );
    let message = err.to_string();
    assert!(message.contains("999") && message.contains('1'));
}

#[rstest]
#[case(1, 45.0)]
#[case(2, 40.0)]
#[case(5, 25.0)]
#[case(9, 5.0)]
#[case(10, 0.0)]
fn given_ten_node_chain_when_calculating_then_commission_scales_with_depth(
    #[case] id: i64,
    #[case] expected: f64,
) {
    let data = chain_records(10, 3100.0);

    let report = calculate_commissions(&data, january()).unwrap();

    assert_eq!(report.commissions[&id.to_string()], expected);
}

#[test]
fn given_commission_just_below_half_cent_when_rounding_then_rounds_down() {
    // Arrange: 623.5 over 29 days is 21.5 per day, 5 % of that is 1.075 (stored as 1.07499..)
    let data = json!([
        {"id": 1, "monthly_revenue": 0},
        {"id": 2, "parent_id": 1, "monthly_revenue": 623.5},
    ]);

    // Act
    let report = calculate_commissions(&data, NaiveDate::from_ymd_opt(2024, 2, 1)).unwrap();

    // Assert
    assert_eq!(report.days_in_month, 29);
    assert_eq!(report.commissions["1"], 1.07);
    assert_eq!(report.commissions["2"], 0.0);
}

// ============================================================
// Invariants
// ============================================================

fn mixed_network() -> Value {
    json!([
        {"id": 10, "monthly_revenue": 1234.56},
        {"id": 11, "parent_id": 10, "monthly_revenue": 789.01},
        {"id": 12, "parent_id": 10, "monthly_revenue": 45.67},
        {"id": 13, "parent_id": 11, "monthly_revenue": 999.99},
        {"id": 14, "parent_id": 13, "monthly_revenue": 12.34},
        {"id": 20, "monthly_revenue": 500},
        {"id": 21, "parent_id": 20, "monthly_revenue": 0},
    ])
}

#[test]
fn given_any_network_when_calculating_then_one_entry_per_record() {
    let data = mixed_network();

    let report = calculate_commissions(&data, january()).unwrap();

    let mut expected: Vec<String> = data
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].to_string())
        .collect();
    expected.sort();
    let keys: Vec<String> = report.commissions.keys().cloned().collect();
    assert_eq!(keys, expected);
}

#[test]
fn given_any_network_when_calculating_then_commission_matches_descendant_sum() {
    // Arrange
    let data = mixed_network();
    let mut forest = ForestValidator::new()
        .validate(ForestBuilder::new().build_from_json(&data).unwrap())
        .unwrap();
    DailyProfitCalculator::new()
        .calculate_daily_profits(&mut forest, january())
        .unwrap();

    // Act
    let result = CommissionCalculator::new().calculate_commissions(&mut forest);

    // Assert: compare against a naive walk over each node's descendants
    for (idx, node) in forest.nodes() {
        let mut descendant_profit = 0.0;
        let mut stack: Vec<_> = forest.get_node(idx).unwrap().children.clone();
        while let Some(child) = stack.pop() {
            let child_node = forest.get_node(child).unwrap();
            descendant_profit += child_node.data.daily_profit;
            stack.extend(child_node.children.iter().copied());
        }
        let expected = round_currency(descendant_profit * COMMISSION_RATE, 2);
        let actual = result[&node.data.id.to_string()];
        assert!(
            (actual - expected).abs() < 1e-9,
            "partner {}: expected {}, got {}",
            node.data.id,
            expected,
            actual
        );
        if node.is_leaf() {
            assert_eq!(actual, 0.0, "leaf {} must earn nothing", node.data.id);
        }
    }
}

#[test]
fn given_calculated_forest_when_recalculating_then_output_is_identical() {
    let data = mixed_network();
    let mut forest = ForestValidator::new()
        .validate(ForestBuilder::new().build_from_json(&data).unwrap())
        .unwrap();
    let profits = DailyProfitCalculator::new();
    let calculator = CommissionCalculator::new();

    profits.calculate_daily_profits(&mut forest, january()).unwrap();
    let first = calculator.calculate_commissions(&mut forest);
    profits.calculate_daily_profits(&mut forest, january()).unwrap();
    let second = calculator.calculate_commissions(&mut forest);

    assert_eq!(first, second);
}

#[test]
fn given_deep_chain_when_calculating_then_no_stack_overflow() {
    // Arrange
    let depth = 100_000;
    let data = chain_records(depth, 3100.0);

    // Act
    let report = calculate_commissions(&data, january()).unwrap();

    // Assert
    assert_eq!(report.stats.total_partners, depth as usize);
    assert_eq!(report.stats.max_depth, depth as usize - 1);
    assert_eq!(report.commissions[&depth.to_string()], 0.0);
    assert_eq!(
        report.commissions[&(depth - 1).to_string()],
        100.0 * COMMISSION_RATE
    );
}

/// Fastest of three full pipeline runs over a chain of `n` partners.
fn best_run(n: i64) -> std::time::Duration {
    let data = chain_records(n, 3100.0);
    (0..3)
        .map(|_| {
            let start = std::time::Instant::now();
            calculate_commissions(&data, january()).unwrap();
            start.elapsed()
        })
        .min()
        .unwrap()
}

#[test]
#[ignore = "timing sensitive, run with --ignored on an idle machine"]
fn given_doubled_network_when_calculating_then_time_roughly_doubles() {
    // Arrange
    let n = 100_000;
    best_run(n / 10);

    // Act
    let single = best_run(n);
    let double = best_run(2 * n);

    // Assert: quadratic work would show a ratio near 4
    let ratio = double.as_secs_f64() / single.as_secs_f64().max(1e-9);
    assert!(ratio < 3.0, "n -> 2n took {:?} -> {:?} (x{:.2})", single, double, ratio);
}
