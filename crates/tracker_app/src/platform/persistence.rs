use std::path::PathBuf;

use anyhow::{Context, Result};
use budget_core::{stored_budget, stored_expenses, BudgetState, Expense, Resolved, Schema};
use tracker_engine::JsonStore;

/// Budget and expense data under one data directory.
pub struct Storage {
    store: JsonStore,
}

impl Storage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            store: JsonStore::new(data_dir),
        }
    }

    pub fn load_budget(&self) -> BudgetState {
        stored_budget(self.resolve(&Schema::BUDGET))
    }

    pub fn load_expenses(&self) -> Vec<Expense> {
        stored_expenses(self.resolve(&Schema::EXPENSES))
    }

    pub fn save_budget(&self, state: &BudgetState) -> Result<()> {
        let key = Schema::BUDGET.current_key();
        self.store
            .save(key, state)
            .with_context(|| format!("saving budget to {key}"))
    }

    pub fn save_expenses(&self, expenses: &[Expense]) -> Result<()> {
        let key = Schema::EXPENSES.current_key();
        self.store
            .save(key, expenses)
            .with_context(|| format!("saving expenses to {key}"))
    }

    fn resolve(&self, schema: &Schema) -> Resolved {
        schema.resolve(|key| self.store.load_raw(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_core::{update, Msg};
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn saved_budget_loads_back() {
        let temp = tempfile::TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        let (state, _) = update(
            BudgetState::new(),
            Msg::AddBill {
                name: "Rent".into(),
                amount: "100".into(),
                due: "2026-11-01".into(),
            },
        );
        storage.save_budget(&state).unwrap();

        let loaded = storage.load_budget();
        assert_eq!(loaded.bills, state.bills);
        assert!(temp.path().join("budgetGPT_state_v1.json").exists());
    }

    #[test]
    fn missing_files_give_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let storage = Storage::new(temp.path().join("absent"));
        assert_eq!(storage.load_budget(), BudgetState::new());
        assert!(storage.load_expenses().is_empty());
    }

    #[test]
    fn stale_expense_generation_is_not_read() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(
            temp.path().join("spendingTracker_expenses_v1.json"),
            r#"[{"date":"2026-01-02","amount":5,"category":"Food"}]"#,
        )
        .unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        assert!(storage.load_expenses().is_empty());
        assert!(temp.path().join("spendingTracker_expenses_v1.json").exists());
    }
}
