use std::path::PathBuf;

use budget_core::ListKind;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "tracker")]
#[command(about = "Paycheck budget planner and spending tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file; `tracker.ron` in the current directory when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Plan the next paycheck")]
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },

    #[command(about = "Record and review spending")]
    Expenses {
        #[command(subcommand)]
        command: ExpensesCommand,
    },

    #[command(about = "Manage the offline asset cache")]
    Offline {
        #[command(subcommand)]
        command: OfflineCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    #[command(about = "Show settings, lists and the paycheck summary")]
    Show,

    #[command(about = "Update pay rate, tax rate, allocation or recurring usage")]
    Settings {
        #[arg(long)]
        hourly_rate: Option<String>,

        #[arg(long)]
        tax_rate: Option<String>,

        #[arg(long)]
        savings: Option<String>,

        #[arg(long)]
        spending: Option<String>,

        #[arg(long)]
        investing: Option<String>,

        #[arg(long)]
        use_recurring: Option<bool>,
    },

    #[command(about = "Update current account balances")]
    Balances {
        #[arg(long)]
        checking: Option<String>,

        #[arg(long)]
        savings: Option<String>,
    },

    #[command(about = "Update the upcoming paycheck")]
    Pay {
        #[arg(long)]
        hours: Option<String>,

        #[arg(long)]
        date: Option<String>,
    },

    #[command(about = "Add a bill due before the next paycheck")]
    AddBill {
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        amount: String,

        #[arg(long, default_value = "")]
        due: String,
    },

    #[command(about = "Add a planned debt payment")]
    AddDebt {
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        amount: String,

        #[arg(long, default_value = "")]
        due: String,
    },

    #[command(about = "Add a savings goal")]
    AddGoal {
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        target: String,

        #[arg(long, default_value = "")]
        current: String,
    },

    #[command(about = "Add a recurring charge")]
    AddRecurring {
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        amount: String,

        #[arg(long, default_value = "")]
        note: String,
    },

    #[command(about = "Remove a list item by id")]
    Remove { kind: KindArg, id: String },

    #[command(about = "Wipe all budget data")]
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExpensesCommand {
    #[command(about = "Record an expense")]
    Add {
        #[arg(long)]
        amount: String,

        /// YYYY-MM-DD; today when omitted.
        #[arg(long)]
        date: Option<String>,

        #[arg(long, default_value = "")]
        category: String,

        #[arg(long, default_value = "")]
        note: String,
    },

    #[command(about = "List expenses, newest first, with totals")]
    List,

    #[command(about = "Delete every expense")]
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum OfflineCommand {
    #[command(about = "Precache the app shell under the current cache version")]
    Install,

    #[command(about = "Delete caches of other versions and start serving")]
    Activate,

    #[command(about = "Request a path through the offline cache")]
    Fetch {
        path: String,

        #[arg(long, default_value = "GET")]
        method: String,
    },

    #[command(about = "Show worker state and stored caches")]
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Bill,
    Debt,
    Goal,
    Recurring,
}

impl From<KindArg> for ListKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Bill => ListKind::Bill,
            KindArg::Debt => ListKind::Debt,
            KindArg::Goal => ListKind::Goal,
            KindArg::Recurring => ListKind::Recurring,
        }
    }
}
