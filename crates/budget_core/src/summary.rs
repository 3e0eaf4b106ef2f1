use crate::numeric::finite_or_zero;
use crate::state::{Alloc, BudgetState, Goal};

/// Figures derived from a budget state. All values are finite.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub gross_pay: f64,
    pub net_pay: f64,
    pub total_cash_after: f64,
    pub bills_total: f64,
    pub debts_total: f64,
    pub recurring_total: f64,
    /// Recurring charges counted towards required spend (zero when disabled).
    pub effective_recurring: f64,
    pub required_total: f64,
    /// Cash left after required spend. May be negative.
    pub safe_to_spend: f64,
    pub suggestions: Allocation,
}

/// Suggested split of the non-negative leftover.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Allocation {
    pub savings: f64,
    pub spending: f64,
    pub investing: f64,
}

impl Allocation {
    pub fn of(amount: f64, alloc: &Alloc) -> Self {
        let share = |percent: f64| finite_or_zero(amount * percent / 100.0);
        Self {
            savings: share(alloc.savings),
            spending: share(alloc.spending),
            investing: share(alloc.investing),
        }
    }
}

pub fn compute_summary(state: &BudgetState) -> Summary {
    let gross_pay = finite_or_zero(state.hourly_rate * state.pay.hours);
    let net_pay = finite_or_zero(gross_pay * (1.0 - state.tax_rate / 100.0));

    let total_cash_after = finite_or_zero(state.balances.checking)
        + finite_or_zero(state.balances.savings)
        + net_pay;

    let bills_total = sum_amounts(state.bills.iter().map(|b| b.amount));
    let debts_total = sum_amounts(state.debts.iter().map(|d| d.amount));
    let recurring_total = sum_amounts(state.recurring.iter().map(|r| r.amount));
    let effective_recurring = if state.use_recurring {
        recurring_total
    } else {
        0.0
    };

    let required_total = bills_total + debts_total + effective_recurring;
    let safe_to_spend = total_cash_after - required_total;
    let safe = safe_to_spend.max(0.0);

    Summary {
        gross_pay,
        net_pay,
        total_cash_after,
        bills_total,
        debts_total,
        recurring_total,
        effective_recurring,
        required_total,
        safe_to_spend,
        suggestions: Allocation::of(safe, &state.alloc),
    }
}

/// Progress towards a goal in percent, capped at 100. Zero when the target is not positive.
pub fn goal_progress(goal: &Goal) -> f64 {
    if goal.target > 0.0 {
        finite_or_zero((goal.current / goal.target * 100.0).min(100.0))
    } else {
        0.0
    }
}

fn sum_amounts(amounts: impl Iterator<Item = f64>) -> f64 {
    amounts.map(finite_or_zero).sum()
}
