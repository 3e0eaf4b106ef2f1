//! Spending tracker: a flat, append-only expense list with bulk clear.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::numeric::{coerce_value, parse_finite};
use crate::schema::Resolved;
use crate::state::fresh_id;
use crate::view_model::ExpenseViewModel;
use crate::Effect;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_CATEGORY: &str = "Other";
pub const INVALID_AMOUNT_ALERT: &str = "Please enter a valid positive amount.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub id: String,
    pub date: String,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub note: String,
}

impl Expense {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }
}

/// Raw form input for a new expense.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpenseDraft {
    pub date: Option<String>,
    pub amount: String,
    pub category: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseMsg {
    /// User submitted the expense form. `today` fills a missing date.
    Add { draft: ExpenseDraft, today: NaiveDate },
    /// User asked to delete every expense; needs confirmation.
    ClearRequested,
    /// User confirmed the clear.
    ClearConfirmed,
    /// Replace the list with previously persisted data.
    Restore(Vec<Expense>),
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseLedger {
    expenses: Vec<Expense>,
    dirty: bool,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in insertion order, as stored.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self, today: NaiveDate) -> ExpenseViewModel {
        ExpenseViewModel::from_ledger(self, today)
    }

    /// Reads a stored expense array. Corrupt data yields an empty list.
    ///
    /// Entries whose amount is not a positive number are dropped.
    pub fn parse_stored(raw: &str) -> Vec<Expense> {
        let items = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                tracker_warn!("Stored expenses are not a list ({}), using empty list", other);
                return Vec::new();
            }
            Err(err) => {
                tracker_warn!("Failed to load expenses, using empty list: {}", err);
                return Vec::new();
            }
        };

        items
            .into_iter()
            .filter_map(|item| {
                let Value::Object(fields) = item else {
                    return None;
                };
                let amount = fields.get("amount").map(coerce_value).unwrap_or(0.0);
                if amount <= 0.0 {
                    tracker_debug!("Dropping stored expense without a positive amount");
                    return None;
                }
                let text = |key: &str| match fields.get(key) {
                    Some(Value::String(s)) => s.clone(),
                    _ => String::new(),
                };
                let id = text("id");
                Some(Expense {
                    id: if id.is_empty() { fresh_id() } else { id },
                    date: text("date"),
                    amount,
                    category: text("category"),
                    note: text("note"),
                })
            })
            .collect()
    }
}

/// Expenses to start from, given a storage lookup.
pub fn stored_expenses(resolved: Resolved) -> Vec<Expense> {
    match resolved {
        Resolved::Current(raw) => ExpenseLedger::parse_stored(&raw),
        Resolved::StaleOnly { .. } | Resolved::Missing => Vec::new(),
    }
}

/// Pure update function for the spending tracker.
pub fn update_expenses(mut ledger: ExpenseLedger, msg: ExpenseMsg) -> (ExpenseLedger, Vec<Effect>) {
    let effects = match msg {
        ExpenseMsg::Add { draft, today } => {
            let category = draft.category.trim().to_string();
            let raw_amount = draft.amount.trim();
            if category.is_empty() && raw_amount.is_empty() {
                return (ledger, Vec::new());
            }
            let Some(amount) = parse_finite(raw_amount).filter(|a| *a > 0.0) else {
                return (ledger, vec![Effect::Alert(INVALID_AMOUNT_ALERT.to_string())]);
            };
            let date = draft
                .date
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| today.format(DATE_FORMAT).to_string());
            ledger.expenses.push(Expense {
                id: fresh_id(),
                date,
                amount,
                category: if category.is_empty() {
                    DEFAULT_CATEGORY.to_string()
                } else {
                    category
                },
                note: draft.note.trim().to_string(),
            });
            ledger.dirty = true;
            vec![Effect::PersistExpenses]
        }
        ExpenseMsg::ClearRequested => vec![Effect::ConfirmClear],
        ExpenseMsg::ClearConfirmed => {
            tracker_info!("Clearing {} expenses", ledger.expenses.len());
            ledger.expenses.clear();
            ledger.dirty = true;
            vec![Effect::PersistExpenses]
        }
        ExpenseMsg::Restore(expenses) => {
            ledger.expenses = expenses;
            ledger.dirty = true;
            Vec::new()
        }
        ExpenseMsg::NoOp => Vec::new(),
    };

    (ledger, effects)
}

/// Newest date first; entries with unreadable dates go last, keeping their order.
pub fn sorted_newest_first(expenses: &[Expense]) -> Vec<&Expense> {
    let mut sorted: Vec<&Expense> = expenses.iter().collect();
    sorted.sort_by_key(|e| std::cmp::Reverse(e.parsed_date()));
    sorted
}

/// Sum of expenses dated in the same calendar month and year as `today`.
pub fn month_total(expenses: &[Expense], today: NaiveDate) -> f64 {
    expenses
        .iter()
        .filter(|e| {
            e.parsed_date()
                .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
        })
        .map(|e| e.amount)
        .sum()
}

pub fn total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Totals per category, largest first; ties ordered by name.
pub fn category_totals(expenses: &[Expense]) -> Vec<(String, f64)> {
    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    for expense in expenses {
        *by_category.entry(expense.category.as_str()).or_default() += expense.amount;
    }
    let mut totals: Vec<(String, f64)> = by_category
        .into_iter()
        .map(|(name, amount)| (name.to_string(), amount))
        .collect();
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}
