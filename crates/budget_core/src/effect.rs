/// Side effects requested by the pure update functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the budget state to its storage key.
    PersistBudget,
    /// Write the expense list to its storage key.
    PersistExpenses,
    /// Ask the user before wiping budget data.
    ConfirmReset,
    /// Ask the user before clearing all expenses.
    ConfirmClear,
    /// Show a message the user must acknowledge.
    Alert(String),
}

pub const RESET_PROMPT: &str = "Reset all data? This cannot be undone.";
pub const CLEAR_PROMPT: &str = "Clear all expenses? This cannot be undone.";
