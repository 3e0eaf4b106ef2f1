use std::io::{self, BufRead, Write};

use anyhow::Result;
use budget_core::{BudgetState, Effect, ExpenseLedger, ExpenseMsg, Msg, CLEAR_PROMPT, RESET_PROMPT};
use tracker_logging::{tracker_info, tracker_warn};

use super::persistence::Storage;

/// Answers yes/no questions before destructive actions.
pub trait Confirmer {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Asks on the terminal. Anything but `y`/`yes` is a no.
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

/// Confirms everything; used for `--yes`.
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Carries out effects from the update functions.
///
/// Confirmations that succeed come back as follow-up messages for the caller
/// to feed into the next update.
pub struct EffectRunner<'a> {
    storage: &'a Storage,
    confirmer: Box<dyn Confirmer + 'a>,
    alerts: Box<dyn Write + 'a>,
}

impl<'a> EffectRunner<'a> {
    pub fn new(storage: &'a Storage, confirmer: Box<dyn Confirmer + 'a>) -> Self {
        Self::with_alert_sink(storage, confirmer, Box::new(io::stderr()))
    }

    pub fn with_alert_sink(
        storage: &'a Storage,
        confirmer: Box<dyn Confirmer + 'a>,
        alerts: Box<dyn Write + 'a>,
    ) -> Self {
        Self {
            storage,
            confirmer,
            alerts,
        }
    }

    pub fn run_budget(&mut self, state: &BudgetState, effects: Vec<Effect>) -> Result<Vec<Msg>> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::PersistBudget => self.storage.save_budget(state)?,
                Effect::ConfirmReset => {
                    if self.confirmer.confirm(RESET_PROMPT) {
                        follow_ups.push(Msg::ResetConfirmed);
                    } else {
                        tracker_info!("Reset cancelled");
                    }
                }
                Effect::Alert(message) => self.alert(&message),
                other => tracker_warn!("Ignoring {:?} from the budget tracker", other),
            }
        }
        Ok(follow_ups)
    }

    pub fn run_expenses(
        &mut self,
        ledger: &ExpenseLedger,
        effects: Vec<Effect>,
    ) -> Result<Vec<ExpenseMsg>> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::PersistExpenses => self.storage.save_expenses(ledger.expenses())?,
                Effect::ConfirmClear => {
                    if self.confirmer.confirm(CLEAR_PROMPT) {
                        follow_ups.push(ExpenseMsg::ClearConfirmed);
                    } else {
                        tracker_info!("Clear cancelled");
                    }
                }
                Effect::Alert(message) => self.alert(&message),
                other => tracker_warn!("Ignoring {:?} from the spending tracker", other),
            }
        }
        Ok(follow_ups)
    }

    fn alert(&mut self, message: &str) {
        tracker_warn!("Alert: {}", message);
        let _ = writeln!(self.alerts, "{message}");
    }
}
