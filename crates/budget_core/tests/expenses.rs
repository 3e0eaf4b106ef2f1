use std::sync::Once;

use budget_core::expense::INVALID_AMOUNT_ALERT;
use budget_core::{
    stored_expenses, update_expenses, Effect, Expense, ExpenseDraft, ExpenseLedger, ExpenseMsg,
    Resolved,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn add(ledger: ExpenseLedger, amount: &str, date: Option<&str>, category: &str) -> (ExpenseLedger, Vec<Effect>) {
    update_expenses(
        ledger,
        ExpenseMsg::Add {
            draft: ExpenseDraft {
                date: date.map(str::to_string),
                amount: amount.to_string(),
                category: category.to_string(),
                note: String::new(),
            },
            today: today(),
        },
    )
}

#[test]
fn negative_amount_is_rejected_with_alert() {
    init_logging();
    let (mut ledger, effects) = add(ExpenseLedger::new(), "-5", None, "Food");

    assert_eq!(effects, vec![Effect::Alert(INVALID_AMOUNT_ALERT.to_string())]);
    assert!(ledger.is_empty());
    assert!(!ledger.consume_dirty());

    for bad in ["0", "abc", "NaN"] {
        let (next, effects) = add(ledger, bad, None, "Food");
        assert!(matches!(effects.as_slice(), [Effect::Alert(_)]), "amount {bad:?}");
        ledger = next;
    }
    assert!(ledger.is_empty());
}

#[test]
fn missing_date_defaults_to_today() {
    init_logging();
    let (mut ledger, effects) = add(ExpenseLedger::new(), "12.5", None, "Coffee");

    assert_eq!(effects, vec![Effect::PersistExpenses]);
    assert_eq!(ledger.len(), 1);
    let expense = &ledger.expenses()[0];
    assert_eq!(expense.date, "2024-06-15");
    assert_eq!(expense.amount, 12.5);
    assert_eq!(expense.category, "Coffee");
    assert!(!expense.id.is_empty());
    assert!(ledger.consume_dirty());

    let (ledger, _) = add(ledger, "3", Some("  "), "");
    assert_eq!(ledger.expenses()[1].date, "2024-06-15");
    assert_eq!(ledger.expenses()[1].category, "Other");
}

#[test]
fn empty_form_is_ignored_silently() {
    init_logging();
    let (ledger, effects) = add(ExpenseLedger::new(), "  ", None, " ");
    assert!(effects.is_empty());
    assert!(ledger.is_empty());
}

#[test]
fn clear_requires_confirmation() {
    init_logging();
    let (ledger, _) = add(ExpenseLedger::new(), "4", None, "Snacks");

    let (ledger, effects) = update_expenses(ledger, ExpenseMsg::ClearRequested);
    assert_eq!(effects, vec![Effect::ConfirmClear]);
    assert_eq!(ledger.len(), 1);

    let (ledger, effects) = update_expenses(ledger, ExpenseMsg::ClearConfirmed);
    assert_eq!(effects, vec![Effect::PersistExpenses]);
    assert!(ledger.is_empty());
}

#[test]
fn view_sorts_newest_first_and_totals_this_month() {
    init_logging();
    let (ledger, _) = add(ExpenseLedger::new(), "10", Some("2024-05-31"), "Food");
    let (ledger, _) = add(ledger, "20", Some("2024-06-02"), "Rent");
    let (ledger, _) = add(ledger, "5.5", Some("2024-06-14"), "Food");
    let (ledger, _) = add(ledger, "1", Some("someday"), "Misc");
    let (ledger, _) = add(ledger, "7", Some("2023-06-20"), "Food");

    let view = ledger.view(today());
    let dates: Vec<&str> = view.rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(
        dates,
        vec!["2024-06-14", "2024-06-02", "2024-05-31", "2023-06-20", "someday"]
    );
    assert_eq!(view.count, 5);
    assert_eq!(view.month_total, "$25.50");
    assert_eq!(view.total, "$43.50");
    assert_eq!(view.categories[0].category, "Food");
    assert_eq!(view.categories[0].amount, "$22.50");
    assert_eq!(view.categories[1].category, "Rent");
}

#[test]
fn stored_list_is_parsed_leniently() {
    init_logging();
    let raw = r#"[
        {"date": "2024-06-01", "amount": 9.99, "category": "Books", "note": "paperback"},
        {"date": "2024-06-02", "amount": -3, "category": "Bad"},
        {"date": "2024-06-03", "amount": "4", "category": "Snacks", "id": "keep-me"},
        "garbage"
    ]"#;
    let expenses = stored_expenses(Resolved::Current(raw.to_string()));

    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].note, "paperback");
    assert!(!expenses[0].id.is_empty());
    assert_eq!(expenses[1].id, "keep-me");
    assert_eq!(expenses[1].amount, 4.0);

    assert!(stored_expenses(Resolved::Current("{oops".to_string())).is_empty());
    assert!(stored_expenses(Resolved::Current("{}".to_string())).is_empty());
    assert!(stored_expenses(Resolved::StaleOnly {
        key: "spendingTracker_expenses_v1"
    })
    .is_empty());
}

#[test]
fn restore_then_serialize_keeps_flat_array_shape() {
    init_logging();
    let expense = Expense {
        id: "e1".to_string(),
        date: "2024-06-01".to_string(),
        amount: 3.0,
        category: "Tea".to_string(),
        note: String::new(),
    };
    let (ledger, effects) = update_expenses(ExpenseLedger::new(), ExpenseMsg::Restore(vec![expense]));
    assert!(effects.is_empty());

    let json = serde_json::to_value(ledger.expenses()).unwrap();
    assert!(json.is_array());
    assert_eq!(json[0]["category"], "Tea");
}
