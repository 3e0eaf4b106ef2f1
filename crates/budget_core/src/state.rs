use serde::{Deserialize, Serialize};

use crate::view_model::BudgetViewModel;

pub const DEFAULT_HOURLY_RATE: f64 = 22.5;
pub const DEFAULT_TAX_RATE: f64 = 14.0;

/// Split of the safe-to-spend leftover, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alloc {
    pub savings: f64,
    pub spending: f64,
    pub investing: f64,
}

impl Default for Alloc {
    fn default() -> Self {
        Self {
            savings: 50.0,
            spending: 40.0,
            investing: 10.0,
        }
    }
}

impl Alloc {
    /// Rescales raw ratios so the three shares add up to 100.
    ///
    /// Negative ratios count as zero. When nothing positive is left the
    /// default split is used instead.
    pub fn normalized(savings: f64, spending: f64, investing: f64) -> Self {
        let clamp = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let (s, p, i) = (clamp(savings), clamp(spending), clamp(investing));
        let largest = s.max(p).max(i);
        if largest <= 0.0 {
            return Self::default();
        }
        // Scaled by the largest share so the sum cannot overflow.
        let (s, p, i) = (s / largest, p / largest, i / largest);
        let total = s + p + i;
        let savings = s / total * 100.0;
        let spending = p / total * 100.0;
        Self {
            savings,
            spending,
            investing: 100.0 - savings - spending,
        }
    }

    pub fn total(&self) -> f64 {
        self.savings + self.spending + self.investing
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pay {
    pub hours: f64,
    /// ISO date of the upcoming pay day, empty when unset.
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Balances {
    pub checking: f64,
    pub savings: f64,
}

/// A bill or a planned debt payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub due: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target: f64,
    pub current: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringCharge {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub note: String,
}

/// Which list a removal targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Bill,
    Debt,
    Goal,
    Recurring,
}

impl ListKind {
    pub fn label(self) -> &'static str {
        match self {
            ListKind::Bill => "bill",
            ListKind::Debt => "debt",
            ListKind::Goal => "goal",
            ListKind::Recurring => "recurring",
        }
    }
}

/// Budget tracker state. Serializes to the stored JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetState {
    pub hourly_rate: f64,
    pub tax_rate: f64,
    pub alloc: Alloc,
    pub pay: Pay,
    pub balances: Balances,
    pub bills: Vec<Obligation>,
    pub debts: Vec<Obligation>,
    pub goals: Vec<Goal>,
    pub recurring: Vec<RecurringCharge>,
    pub use_recurring: bool,
    #[serde(skip)]
    dirty: bool,
}

impl Default for BudgetState {
    fn default() -> Self {
        Self {
            hourly_rate: DEFAULT_HOURLY_RATE,
            tax_rate: DEFAULT_TAX_RATE,
            alloc: Alloc::default(),
            pay: Pay::default(),
            balances: Balances::default(),
            bills: Vec::new(),
            debts: Vec::new(),
            goals: Vec::new(),
            recurring: Vec::new(),
            use_recurring: true,
            dirty: false,
        }
    }
}

impl BudgetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> BudgetViewModel {
        BudgetViewModel::from_state(self)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drops the entry with `id` from the chosen list. Returns whether anything was removed.
    pub(crate) fn remove_item(&mut self, kind: ListKind, id: &str) -> bool {
        fn retain_without<T>(items: &mut Vec<T>, id: &str, id_of: impl Fn(&T) -> &str) -> bool {
            let before = items.len();
            items.retain(|item| id_of(item) != id);
            items.len() != before
        }

        match kind {
            ListKind::Bill => retain_without(&mut self.bills, id, |b| b.id.as_str()),
            ListKind::Debt => retain_without(&mut self.debts, id, |d| d.id.as_str()),
            ListKind::Goal => retain_without(&mut self.goals, id, |g| g.id.as_str()),
            ListKind::Recurring => retain_without(&mut self.recurring, id, |r| r.id.as_str()),
        }
    }
}

/// Fresh identifier for a new list entry.
pub(crate) fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
