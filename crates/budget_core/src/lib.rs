//! Budget core: pure state machines, merge policy and derived summaries for
//! the budget and spending trackers.
mod effect;
pub mod expense;
mod format;
mod merge;
mod msg;
pub mod numeric;
mod schema;
mod state;
mod summary;
mod update;
mod view_model;

pub use effect::{Effect, CLEAR_PROMPT, RESET_PROMPT};
pub use expense::{stored_expenses, update_expenses, Expense, ExpenseDraft, ExpenseLedger, ExpenseMsg};
pub use format::{format_money, format_percent, CURRENCY};
pub use merge::{merge_persisted, merge_value, stored_budget};
pub use msg::Msg;
pub use schema::{generation_of, Resolved, Schema, BUDGET_KEY, EXPENSES_KEY};
pub use state::{
    Alloc, Balances, BudgetState, Goal, ListKind, Obligation, Pay, RecurringCharge,
    DEFAULT_HOURLY_RATE, DEFAULT_TAX_RATE,
};
pub use summary::{compute_summary, goal_progress, Allocation, Summary};
pub use update::update;
pub use view_model::{
    BudgetViewModel, CategoryTotalView, ExpenseRowView, ExpenseViewModel, GoalRowView,
    ItemRowView, SettingsView, SummaryView,
};

