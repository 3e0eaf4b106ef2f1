use std::sync::Once;

use budget_core::{
    merge_persisted, stored_budget, Alloc, BudgetState, Resolved, Schema, BUDGET_KEY,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

#[test]
fn partial_alloc_and_balances_keep_default_sub_keys() {
    init_logging();
    let state = merge_persisted(r#"{"alloc":{"savings":70},"balances":{"checking":250}}"#);

    assert_eq!(state.alloc.savings, 70.0);
    assert_eq!(state.alloc.spending, Alloc::default().spending);
    assert_eq!(state.alloc.investing, Alloc::default().investing);
    assert_eq!(state.balances.checking, 250.0);
    assert_eq!(state.balances.savings, 0.0);
    assert_eq!(state.hourly_rate, 22.5);
    assert!(state.use_recurring);
}

#[test]
fn top_level_keys_override_and_lists_replace_wholesale() {
    init_logging();
    let raw = r#"{
        "hourlyRate": 30,
        "taxRate": "12.5",
        "useRecurring": false,
        "pay": {"hours": 38},
        "bills": [{"id": "b1", "name": "Rent", "amount": 900, "due": "2024-06-01"}],
        "goals": [{"id": "g1", "name": "Trip", "target": 1200, "current": "300"}]
    }"#;
    let state = merge_persisted(raw);

    assert_eq!(state.hourly_rate, 30.0);
    assert_eq!(state.tax_rate, 12.5);
    assert!(!state.use_recurring);
    assert_eq!(state.pay.hours, 38.0);
    assert_eq!(state.pay.date, "");
    assert_eq!(state.bills.len(), 1);
    assert_eq!(state.bills[0].id, "b1");
    assert_eq!(state.bills[0].due, "2024-06-01");
    assert_eq!(state.goals[0].current, 300.0);
    assert!(state.debts.is_empty());
    assert!(state.recurring.is_empty());
}

#[test]
fn corrupt_json_yields_exact_defaults() {
    init_logging();
    for raw in ["{not json", "", "[1,2,3]", "42", "\"text\"", "null"] {
        assert_eq!(merge_persisted(raw), BudgetState::default(), "input {raw:?}");
    }
}

#[test]
fn non_list_collections_fall_back_to_empty() {
    init_logging();
    let state = merge_persisted(r#"{"bills": "oops", "debts": [{"amount": "x"}, 7]}"#);

    assert!(state.bills.is_empty());
    assert_eq!(state.debts.len(), 1);
    assert_eq!(state.debts[0].amount, 0.0);
    assert!(!state.debts[0].id.is_empty());
}

#[test]
fn saved_state_round_trips_through_merge() {
    init_logging();
    let mut state = BudgetState::default();
    state.hourly_rate = 18.0;
    state.balances.savings = 42.0;
    state.pay.date = "2024-07-12".to_string();

    let raw = serde_json::to_string(&state).unwrap();
    assert_eq!(merge_persisted(&raw), state);
}

#[test]
fn stale_generation_resets_to_defaults() {
    init_logging();
    assert_eq!(Schema::BUDGET.current_key(), BUDGET_KEY);

    let state = stored_budget(Resolved::StaleOnly {
        key: "budgetGPT_state_v0",
    });
    assert_eq!(state, BudgetState::default());

    let state = stored_budget(Resolved::Current(r#"{"taxRate": 20}"#.to_string()));
    assert_eq!(state.tax_rate, 20.0);
}
