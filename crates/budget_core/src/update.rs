use tracker_logging::{tracker_debug, tracker_info};

use crate::numeric::coerce_input;
use crate::state::{fresh_id, Alloc, BudgetState, Goal, Obligation, RecurringCharge};
use crate::{Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: BudgetState, msg: Msg) -> (BudgetState, Vec<Effect>) {
    let effects = match msg {
        Msg::SaveSettings {
            hourly_rate,
            tax_rate,
            alloc_savings,
            alloc_spending,
            alloc_investing,
            use_recurring,
        } => {
            state.hourly_rate = coerce_input(&hourly_rate);
            state.tax_rate = coerce_input(&tax_rate);
            state.alloc = Alloc::normalized(
                coerce_input(&alloc_savings),
                coerce_input(&alloc_spending),
                coerce_input(&alloc_investing),
            );
            state.use_recurring = use_recurring;
            persisted(&mut state)
        }
        Msg::SaveBalances { checking, savings } => {
            state.balances.checking = coerce_input(&checking);
            state.balances.savings = coerce_input(&savings);
            persisted(&mut state)
        }
        Msg::SavePay { hours, date } => {
            state.pay.hours = coerce_input(&hours);
            state.pay.date = date.trim().to_string();
            persisted(&mut state)
        }
        Msg::AddBill { name, amount, due } => match new_obligation(name, &amount, due) {
            Some(bill) => {
                tracker_debug!("Adding bill {}", bill.id);
                state.bills.push(bill);
                persisted(&mut state)
            }
            None => Vec::new(),
        },
        Msg::AddDebt { name, amount, due } => match new_obligation(name, &amount, due) {
            Some(debt) => {
                tracker_debug!("Adding debt {}", debt.id);
                state.debts.push(debt);
                persisted(&mut state)
            }
            None => Vec::new(),
        },
        Msg::AddGoal {
            name,
            target,
            current,
        } => {
            let name = name.trim().to_string();
            let target = coerce_input(&target);
            if name.is_empty() && target == 0.0 {
                return (state, Vec::new());
            }
            state.goals.push(Goal {
                id: fresh_id(),
                name,
                target,
                current: coerce_input(&current),
            });
            persisted(&mut state)
        }
        Msg::AddRecurring { name, amount, note } => {
            let name = name.trim().to_string();
            let amount = coerce_input(&amount);
            if name.is_empty() && amount == 0.0 {
                return (state, Vec::new());
            }
            state.recurring.push(RecurringCharge {
                id: fresh_id(),
                name,
                amount,
                note: note.trim().to_string(),
            });
            persisted(&mut state)
        }
        Msg::Remove { kind, id } => {
            if state.remove_item(kind, &id) {
                persisted(&mut state)
            } else {
                tracker_debug!("No {} with id {} to remove", kind.label(), id);
                Vec::new()
            }
        }
        Msg::ResetRequested => vec![Effect::ConfirmReset],
        Msg::ResetConfirmed => {
            tracker_info!("Resetting budget state to defaults");
            state = BudgetState::default();
            persisted(&mut state)
        }
        Msg::Restore(restored) => {
            state = restored;
            state.mark_dirty();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn persisted(state: &mut BudgetState) -> Vec<Effect> {
    state.mark_dirty();
    vec![Effect::PersistBudget]
}

/// Builds a bill or debt, or `None` when both name and amount are empty.
fn new_obligation(name: String, amount: &str, due: String) -> Option<Obligation> {
    let name = name.trim().to_string();
    let amount = coerce_input(amount);
    if name.is_empty() && amount == 0.0 {
        return None;
    }
    Some(Obligation {
        id: fresh_id(),
        name,
        amount,
        due: due.trim().to_string(),
    })
}
