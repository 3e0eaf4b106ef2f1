//! Storage keys and schema generations.
//!
//! Each app stores one JSON value under a key whose `_vN` suffix names the
//! schema generation. There is no migration between generations: finding
//! only an older key means the old data is ignored and defaults are used.

use tracker_logging::tracker_warn;

/// Current budget tracker key.
pub const BUDGET_KEY: &str = "budgetGPT_state_v1";
/// Current spending tracker key.
pub const EXPENSES_KEY: &str = "spendingTracker_expenses_v2";

/// Known keys of one app, oldest generation first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub app: &'static str,
    pub generations: &'static [&'static str],
}

impl Schema {
    pub const BUDGET: Schema = Schema {
        app: "budget",
        generations: &[BUDGET_KEY],
    };

    pub const EXPENSES: Schema = Schema {
        app: "expenses",
        generations: &["spendingTracker_expenses_v1", EXPENSES_KEY],
    };

    /// Key that reads and writes go to.
    pub fn current_key(&self) -> &'static str {
        self.generations
            .last()
            .copied()
            .unwrap_or(self.app)
    }

    pub fn current_generation(&self) -> u32 {
        generation_of(self.current_key()).unwrap_or(0)
    }

    /// Looks up stored data, newest generation first.
    ///
    /// `lookup` returns the raw stored text for a key, if any.
    pub fn resolve(&self, lookup: impl Fn(&str) -> Option<String>) -> Resolved {
        let current = self.current_key();
        if let Some(raw) = lookup(current) {
            return Resolved::Current(raw);
        }

        let stale = self
            .generations
            .iter()
            .rev()
            .skip(1)
            .copied()
            .find(|key| lookup(key).is_some());

        match stale {
            Some(key) => {
                tracker_warn!(
                    "Found {} data only under older key {:?} (generation {:?}, current {}); starting from defaults",
                    self.app,
                    key,
                    generation_of(key),
                    self.current_generation()
                );
                Resolved::StaleOnly { key }
            }
            None => Resolved::Missing,
        }
    }
}

/// Outcome of looking up an app's stored data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Raw text stored under the current key.
    Current(String),
    /// Only an older generation exists; it is not migrated.
    StaleOnly { key: &'static str },
    Missing,
}

/// Parses the numeric `_vN` suffix of a storage key.
pub fn generation_of(key: &str) -> Option<u32> {
    let (_, suffix) = key.rsplit_once("_v")?;
    suffix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn generation_suffix_is_parsed() {
        assert_eq!(generation_of(BUDGET_KEY), Some(1));
        assert_eq!(generation_of(EXPENSES_KEY), Some(2));
        assert_eq!(generation_of("plain"), None);
        assert_eq!(Schema::EXPENSES.current_generation(), 2);
    }

    #[test]
    fn current_key_wins_over_stale_data() {
        let stored: HashMap<&str, &str> = [
            ("spendingTracker_expenses_v1", "[1]"),
            (EXPENSES_KEY, "[2]"),
        ]
        .into_iter()
        .collect();
        let resolved = Schema::EXPENSES.resolve(|key| stored.get(key).map(|s| s.to_string()));
        assert_eq!(resolved, Resolved::Current("[2]".to_string()));
    }

    #[test]
    fn stale_only_is_reported_not_migrated() {
        let resolved = Schema::EXPENSES.resolve(|key| {
            (key == "spendingTracker_expenses_v1").then(|| "[]".to_string())
        });
        assert_eq!(
            resolved,
            Resolved::StaleOnly {
                key: "spendingTracker_expenses_v1"
            }
        );
        assert_eq!(Schema::BUDGET.resolve(|_| None), Resolved::Missing);
    }
}
