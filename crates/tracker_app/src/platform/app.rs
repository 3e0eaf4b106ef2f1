use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use budget_core::{
    update, update_expenses, BudgetState, ExpenseDraft, ExpenseLedger, ExpenseMsg, Msg,
};
use chrono::Local;
use tracker_engine::{
    AssetRequest, CacheStorage, Method, OfflineWorker, ReqwestFetcher, WorkerEvent, WorkerHandle,
    WorkerSettings,
};
use tracker_logging::{tracker_debug, tracker_info};

use super::config::AppConfig;
use super::effects::{AssumeYes, Confirmer, EffectRunner, TerminalConfirmer};
use super::logging::{self, LogDestination};
use super::persistence::Storage;
use super::render;
use crate::cli::{BudgetCommand, Cli, Commands, ExpensesCommand, OfflineCommand};

pub fn run_app(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(cli.data_dir, cli.log_level);
    logging::initialize(
        LogDestination::from_config(config.log_file.as_deref()),
        &config.log_level,
    );
    tracker_debug!("Using data dir {:?}", config.data_dir);

    match cli.command {
        Commands::Budget { command } => run_budget(&config, command),
        Commands::Expenses { command } => run_expenses(&config, command),
        Commands::Offline { command } => run_offline(&config, command),
    }
}

fn confirmer(yes: bool) -> Box<dyn Confirmer> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalConfirmer)
    }
}

fn run_budget(config: &AppConfig, command: BudgetCommand) -> Result<()> {
    let storage = Storage::new(config.data_dir.clone());
    let mut state = storage.load_budget();
    let (msg, yes) = budget_msg(&state, command);

    let mut runner = EffectRunner::new(&storage, confirmer(yes));
    state = drive_budget(state, msg, &mut runner)?;
    if state.consume_dirty() {
        tracker_info!("Budget updated");
    }
    print!("{}", render::render_budget(&state.view()));
    Ok(())
}

/// Message for a budget command. Omitted flags keep the stored values at full precision.
fn budget_msg(state: &BudgetState, command: BudgetCommand) -> (Msg, bool) {
    match command {
        BudgetCommand::Show => (Msg::NoOp, false),
        BudgetCommand::Settings {
            hourly_rate,
            tax_rate,
            savings,
            spending,
            investing,
            use_recurring,
        } => (
            Msg::SaveSettings {
                hourly_rate: hourly_rate.unwrap_or_else(|| stored(state.hourly_rate)),
                tax_rate: tax_rate.unwrap_or_else(|| stored(state.tax_rate)),
                alloc_savings: savings.unwrap_or_else(|| stored(state.alloc.savings)),
                alloc_spending: spending.unwrap_or_else(|| stored(state.alloc.spending)),
                alloc_investing: investing.unwrap_or_else(|| stored(state.alloc.investing)),
                use_recurring: use_recurring.unwrap_or(state.use_recurring),
            },
            false,
        ),
        BudgetCommand::Balances { checking, savings } => (
            Msg::SaveBalances {
                checking: checking.unwrap_or_else(|| stored(state.balances.checking)),
                savings: savings.unwrap_or_else(|| stored(state.balances.savings)),
            },
            false,
        ),
        BudgetCommand::Pay { hours, date } => (
            Msg::SavePay {
                hours: hours.unwrap_or_else(|| stored(state.pay.hours)),
                date: date.unwrap_or_else(|| state.pay.date.clone()),
            },
            false,
        ),
        BudgetCommand::AddBill { name, amount, due } => (Msg::AddBill { name, amount, due }, false),
        BudgetCommand::AddDebt { name, amount, due } => (Msg::AddDebt { name, amount, due }, false),
        BudgetCommand::AddGoal {
            name,
            target,
            current,
        } => (
            Msg::AddGoal {
                name,
                target,
                current,
            },
            false,
        ),
        BudgetCommand::AddRecurring { name, amount, note } => {
            (Msg::AddRecurring { name, amount, note }, false)
        }
        BudgetCommand::Remove { kind, id } => (
            Msg::Remove {
                kind: kind.into(),
                id,
            },
            false,
        ),
        BudgetCommand::Reset { yes } => (Msg::ResetRequested, yes),
    }
}

/// Stored number as form text; `Display` for `f64` round-trips exactly.
fn stored(value: f64) -> String {
    value.to_string()
}

/// Runs `msg` and any confirmed follow-ups to completion.
fn drive_budget(mut state: BudgetState, msg: Msg, runner: &mut EffectRunner) -> Result<BudgetState> {
    let mut pending = VecDeque::from([msg]);
    while let Some(msg) = pending.pop_front() {
        let (next, effects) = update(state, msg);
        state = next;
        pending.extend(runner.run_budget(&state, effects)?);
    }
    Ok(state)
}

fn run_expenses(config: &AppConfig, command: ExpensesCommand) -> Result<()> {
    let storage = Storage::new(config.data_dir.clone());
    let today = Local::now().date_naive();
    let (mut ledger, _) = update_expenses(
        ExpenseLedger::new(),
        ExpenseMsg::Restore(storage.load_expenses()),
    );
    ledger.consume_dirty();

    let (msg, yes) = match command {
        ExpensesCommand::Add {
            amount,
            date,
            category,
            note,
        } => (
            ExpenseMsg::Add {
                draft: ExpenseDraft {
                    date,
                    amount,
                    category,
                    note,
                },
                today,
            },
            false,
        ),
        ExpensesCommand::List => (ExpenseMsg::NoOp, false),
        ExpensesCommand::Clear { yes } => (ExpenseMsg::ClearRequested, yes),
    };

    let mut runner = EffectRunner::new(&storage, confirmer(yes));
    let mut pending = VecDeque::from([msg]);
    while let Some(msg) = pending.pop_front() {
        let (next, effects) = update_expenses(ledger, msg);
        ledger = next;
        pending.extend(runner.run_expenses(&ledger, effects)?);
    }
    if ledger.consume_dirty() {
        tracker_info!("Expenses updated; {} stored", ledger.len());
    }
    print!("{}", render::render_expenses(&ledger.view(today)));
    Ok(())
}

fn run_offline(config: &AppConfig, command: OfflineCommand) -> Result<()> {
    let settings = config.offline.worker_settings()?;
    let fetch_settings = config.offline.fetch_settings();
    let wait = fetch_settings.request_timeout * (settings.assets.len() as u32 + 1)
        + Duration::from_secs(5);
    let fetcher = ReqwestFetcher::new(fetch_settings).context("building HTTP client")?;
    let storage = CacheStorage::new(config.cache_root());

    if let OfflineCommand::Status = command {
        return print_status(settings, fetcher, storage);
    }

    let request = match &command {
        OfflineCommand::Fetch { path, method } => Some(build_request(&settings, path, method)?),
        _ => None,
    };

    let handle = WorkerHandle::spawn(OfflineWorker::new(settings, Arc::new(fetcher), storage));
    match (command, request) {
        (OfflineCommand::Install, _) => handle.install(),
        (OfflineCommand::Activate, _) => handle.activate(),
        (OfflineCommand::Fetch { .. }, Some(request)) => handle.fetch(1, request),
        _ => bail!("nothing to do"),
    }

    match handle.recv_timeout(wait) {
        Some(WorkerEvent::Installed { cached }) => println!("Installed {cached} assets"),
        Some(WorkerEvent::Activated { deleted }) => {
            if deleted.is_empty() {
                println!("Activated; no stale caches");
            } else {
                println!("Activated; deleted {}", deleted.join(", "));
            }
        }
        Some(WorkerEvent::Fetched { result, .. }) => {
            let served = result.map_err(|reason| anyhow!(reason))?;
            println!("{}", render::render_served(&served));
        }
        Some(WorkerEvent::InstallFailed { reason }) => bail!("install failed: {reason}"),
        Some(WorkerEvent::ActivateFailed { reason }) => bail!("activate failed: {reason}"),
        None => bail!("offline worker did not answer within {wait:?}"),
    }
    Ok(())
}

fn build_request(settings: &WorkerSettings, path: &str, method: &str) -> Result<AssetRequest> {
    let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid method {method:?}"))?;
    let url = settings.resolve(path)?;
    Ok(AssetRequest::new(method, url))
}

fn print_status(settings: WorkerSettings, fetcher: ReqwestFetcher, storage: CacheStorage) -> Result<()> {
    let worker = OfflineWorker::new(settings, Arc::new(fetcher), storage);
    let caches = worker.storage().keys()?;
    println!("Cache version  {}", worker.settings().cache_version);
    println!("Policy         {}", worker.settings().policy);
    println!("State          {:?}", worker.state());
    println!(
        "Serving        {}",
        worker.serving_version().unwrap_or("(nothing)")
    );
    println!(
        "Caches         {}",
        if caches.is_empty() {
            "(none)".to_string()
        } else {
            caches.join(", ")
        }
    );
    Ok(())
}
