use chrono::NaiveDate;

use crate::expense::{category_totals, month_total, sorted_newest_first, total, ExpenseLedger};
use crate::format::{format_money, format_percent};
use crate::state::{BudgetState, ListKind};
use crate::summary::{compute_summary, goal_progress, Summary};

/// Display-ready budget figures. Every amount is already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetViewModel {
    pub settings: SettingsView,
    pub summary: SummaryView,
    pub bills: Vec<ItemRowView>,
    pub debts: Vec<ItemRowView>,
    pub goals: Vec<GoalRowView>,
    pub recurring: Vec<ItemRowView>,
    pub bills_total: String,
    pub debts_total: String,
    pub recurring_total: String,
    /// The recurring list is hidden when recurring charges are disabled.
    pub show_recurring: bool,
    pub raw: Summary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    pub hourly_rate: String,
    pub tax_rate: String,
    pub alloc_savings: String,
    pub alloc_spending: String,
    pub alloc_investing: String,
    pub pay_hours: String,
    pub pay_date: String,
    pub checking: String,
    pub savings: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub net_pay: String,
    pub total_cash_after: String,
    pub recurring: String,
    pub required_total: String,
    pub safe_to_spend: String,
    pub suggest_savings: String,
    pub suggest_spending: String,
    pub suggest_investing: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub kind: ListKind,
    pub id: String,
    pub title: String,
    pub amount: String,
    /// Due date or note line; `None` when there is nothing to show.
    pub meta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalRowView {
    pub id: String,
    pub name: String,
    pub current: String,
    pub target: String,
    pub percent: String,
}

impl BudgetViewModel {
    pub fn from_state(state: &BudgetState) -> Self {
        let summary = compute_summary(state);

        let obligation_rows = |kind: ListKind, fallback: &str, due_label: &str| {
            let items = match kind {
                ListKind::Debt => &state.debts,
                _ => &state.bills,
            };
            items
                .iter()
                .map(|item| ItemRowView {
                    kind,
                    id: item.id.clone(),
                    title: non_empty_or(&item.name, fallback),
                    amount: format_money(item.amount),
                    meta: Some(format!(
                        "{due_label}: {}",
                        non_empty_or(&item.due, "n/a")
                    )),
                })
                .collect::<Vec<_>>()
        };

        Self {
            settings: SettingsView {
                hourly_rate: plain_number(state.hourly_rate),
                tax_rate: plain_number(state.tax_rate),
                alloc_savings: plain_number(state.alloc.savings),
                alloc_spending: plain_number(state.alloc.spending),
                alloc_investing: plain_number(state.alloc.investing),
                pay_hours: plain_number(state.pay.hours),
                pay_date: state.pay.date.clone(),
                checking: plain_number(state.balances.checking),
                savings: plain_number(state.balances.savings),
            },
            summary: SummaryView {
                net_pay: format_money(summary.net_pay),
                total_cash_after: format_money(summary.total_cash_after),
                recurring: format_money(summary.effective_recurring),
                required_total: format_money(summary.required_total),
                safe_to_spend: format_money(summary.safe_to_spend),
                suggest_savings: format_money(summary.suggestions.savings),
                suggest_spending: format_money(summary.suggestions.spending),
                suggest_investing: format_money(summary.suggestions.investing),
            },
            bills: obligation_rows(ListKind::Bill, "Unnamed bill", "Due"),
            debts: obligation_rows(ListKind::Debt, "Debt", "Planned by"),
            goals: state
                .goals
                .iter()
                .map(|goal| GoalRowView {
                    id: goal.id.clone(),
                    name: non_empty_or(&goal.name, "Goal"),
                    current: format_money(goal.current),
                    target: format_money(goal.target),
                    percent: format_percent(goal_progress(goal)),
                })
                .collect(),
            recurring: state
                .recurring
                .iter()
                .map(|charge| ItemRowView {
                    kind: ListKind::Recurring,
                    id: charge.id.clone(),
                    title: non_empty_or(&charge.name, "Recurring"),
                    amount: format_money(charge.amount),
                    meta: (!charge.note.is_empty()).then(|| charge.note.clone()),
                })
                .collect(),
            bills_total: format_money(summary.bills_total),
            debts_total: format_money(summary.debts_total),
            recurring_total: format_money(summary.recurring_total),
            show_recurring: state.use_recurring,
            raw: summary,
        }
    }
}

/// Display-ready spending tracker figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseViewModel {
    /// Newest first.
    pub rows: Vec<ExpenseRowView>,
    pub count: usize,
    pub month_total: String,
    pub total: String,
    pub categories: Vec<CategoryTotalView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRowView {
    pub id: String,
    pub date: String,
    pub amount: String,
    pub category: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotalView {
    pub category: String,
    pub amount: String,
}

impl ExpenseViewModel {
    pub fn from_ledger(ledger: &ExpenseLedger, today: NaiveDate) -> Self {
        let expenses = ledger.expenses();
        Self {
            rows: sorted_newest_first(expenses)
                .into_iter()
                .map(|e| ExpenseRowView {
                    id: e.id.clone(),
                    date: e.date.clone(),
                    amount: format_money(e.amount),
                    category: e.category.clone(),
                    note: (!e.note.is_empty()).then(|| e.note.clone()),
                })
                .collect(),
            count: expenses.len(),
            month_total: format_money(month_total(expenses, today)),
            total: format_money(total(expenses)),
            categories: category_totals(expenses)
                .into_iter()
                .map(|(category, amount)| CategoryTotalView {
                    category,
                    amount: format_money(amount),
                })
                .collect(),
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Numbers as shown in input fields: no trailing zeros, at most two decimals.
fn plain_number(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
