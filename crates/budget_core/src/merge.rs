//! Default-plus-override merge of persisted budget data.
//!
//! Top-level keys found in the stored object override the defaults. The
//! `alloc`, `balances` and `pay` objects merge key by key, so a stored object
//! that lacks a sub-key keeps the default for it. Lists are taken wholesale
//! when present.

use serde_json::{Map, Value};
use tracker_logging::{tracker_debug, tracker_warn};

use crate::numeric::coerce_value;
use crate::schema::Resolved;
use crate::state::{fresh_id, BudgetState, Goal, Obligation, RecurringCharge};

/// Builds a state from stored JSON text. Corrupt text yields the defaults.
pub fn merge_persisted(raw: &str) -> BudgetState {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => merge_value(value),
        Err(err) => {
            tracker_warn!("Failed to load budget state, using defaults: {}", err);
            BudgetState::default()
        }
    }
}

/// Builds the starting state from a storage lookup.
///
/// Stale generations and missing data both start from the defaults.
pub fn stored_budget(resolved: Resolved) -> BudgetState {
    match resolved {
        Resolved::Current(raw) => merge_persisted(&raw),
        Resolved::StaleOnly { .. } | Resolved::Missing => BudgetState::default(),
    }
}

/// Builds a state from an already parsed JSON value.
pub fn merge_value(value: Value) -> BudgetState {
    let Value::Object(stored) = value else {
        tracker_warn!("Stored budget state is not an object, using defaults");
        return BudgetState::default();
    };

    let mut state = BudgetState::default();

    if let Some(v) = stored.get("hourlyRate") {
        state.hourly_rate = coerce_value(v);
    }
    if let Some(v) = stored.get("taxRate") {
        state.tax_rate = coerce_value(v);
    }
    if let Some(v) = stored.get("useRecurring") {
        state.use_recurring = truthy(v);
    }

    if let Some(alloc) = stored.get("alloc").and_then(Value::as_object) {
        merge_number(alloc, "savings", &mut state.alloc.savings);
        merge_number(alloc, "spending", &mut state.alloc.spending);
        merge_number(alloc, "investing", &mut state.alloc.investing);
    }
    if let Some(balances) = stored.get("balances").and_then(Value::as_object) {
        merge_number(balances, "checking", &mut state.balances.checking);
        merge_number(balances, "savings", &mut state.balances.savings);
    }
    if let Some(pay) = stored.get("pay").and_then(Value::as_object) {
        merge_number(pay, "hours", &mut state.pay.hours);
        if let Some(date) = pay.get("date") {
            state.pay.date = text(date);
        }
    }

    state.bills = list(&stored, "bills", obligation);
    state.debts = list(&stored, "debts", obligation);
    state.goals = list(&stored, "goals", |item| Goal {
        id: id_of(item),
        name: field_text(item, "name"),
        target: field_number(item, "target"),
        current: field_number(item, "current"),
    });
    state.recurring = list(&stored, "recurring", |item| RecurringCharge {
        id: id_of(item),
        name: field_text(item, "name"),
        amount: field_number(item, "amount"),
        note: field_text(item, "note"),
    });

    state
}

fn merge_number(source: &Map<String, Value>, key: &str, target: &mut f64) {
    if let Some(v) = source.get(key) {
        *target = coerce_value(v);
    }
}

fn list<T>(
    stored: &Map<String, Value>,
    key: &str,
    build: impl Fn(&Map<String, Value>) -> T,
) -> Vec<T> {
    match stored.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(fields) => Some(build(fields)),
                other => {
                    tracker_debug!("Skipping malformed {} entry: {}", key, other);
                    None
                }
            })
            .collect(),
        Some(other) => {
            tracker_warn!("Stored {} is not a list ({}), starting empty", key, other);
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn obligation(item: &Map<String, Value>) -> Obligation {
    Obligation {
        id: id_of(item),
        name: field_text(item, "name"),
        amount: field_number(item, "amount"),
        due: field_text(item, "due"),
    }
}

/// Entries saved without an id get a new one so they stay removable.
fn id_of(item: &Map<String, Value>) -> String {
    let id = field_text(item, "id");
    if id.is_empty() {
        fresh_id()
    } else {
        id
    }
}

fn field_text(item: &Map<String, Value>, key: &str) -> String {
    item.get(key).map(text).unwrap_or_default()
}

fn field_number(item: &Map<String, Value>, key: &str) -> f64 {
    item.get(key).map(coerce_value).unwrap_or(0.0)
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
