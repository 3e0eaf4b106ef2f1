use crate::state::{BudgetState, ListKind};

/// Budget tracker input. Numeric fields carry the raw form text.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User saved the settings panel.
    SaveSettings {
        hourly_rate: String,
        tax_rate: String,
        alloc_savings: String,
        alloc_spending: String,
        alloc_investing: String,
        use_recurring: bool,
    },
    /// User edited the balance fields.
    SaveBalances { checking: String, savings: String },
    /// User edited the upcoming pay fields.
    SavePay { hours: String, date: String },
    AddBill {
        name: String,
        amount: String,
        due: String,
    },
    AddDebt {
        name: String,
        amount: String,
        due: String,
    },
    AddGoal {
        name: String,
        target: String,
        current: String,
    },
    AddRecurring {
        name: String,
        amount: String,
        note: String,
    },
    /// User clicked Remove on a list row.
    Remove { kind: ListKind, id: String },
    /// User asked to wipe everything; needs confirmation.
    ResetRequested,
    /// User confirmed the reset.
    ResetConfirmed,
    /// Replace state with previously persisted data.
    Restore(BudgetState),
    NoOp,
}
