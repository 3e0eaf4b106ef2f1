//! Plain-text rendering of view models.

use std::fmt::Write as _;

use budget_core::{BudgetViewModel, ExpenseViewModel, ItemRowView};
use tracker_engine::{Served, ServedFrom};

pub fn render_budget(view: &BudgetViewModel) -> String {
    let mut out = String::new();
    let s = &view.settings;
    let _ = writeln!(out, "Settings");
    let _ = writeln!(out, "  Hourly rate     {}", s.hourly_rate);
    let _ = writeln!(out, "  Tax rate        {}%", s.tax_rate);
    let _ = writeln!(
        out,
        "  Allocation      savings {}% / spending {}% / investing {}%",
        s.alloc_savings, s.alloc_spending, s.alloc_investing
    );
    let _ = writeln!(out, "  Pay             {} hours on {}", s.pay_hours, or_dash(&s.pay_date));
    let _ = writeln!(out, "  Balances        checking {} / savings {}", s.checking, s.savings);

    render_rows(&mut out, "Bills", &view.bills, &view.bills_total);
    render_rows(&mut out, "Debts", &view.debts, &view.debts_total);

    let _ = writeln!(out, "\nGoals");
    if view.goals.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for goal in &view.goals {
        let _ = writeln!(
            out,
            "  {}  {} of {} ({})  [{}]",
            goal.name, goal.current, goal.target, goal.percent, goal.id
        );
    }

    if view.show_recurring {
        render_rows(&mut out, "Recurring", &view.recurring, &view.recurring_total);
    }

    let m = &view.summary;
    let _ = writeln!(out, "\nSummary");
    let _ = writeln!(out, "  Net pay              {}", m.net_pay);
    let _ = writeln!(out, "  Cash after payday    {}", m.total_cash_after);
    let _ = writeln!(out, "  Recurring            {}", m.recurring);
    let _ = writeln!(out, "  Required             {}", m.required_total);
    let _ = writeln!(out, "  Safe to spend        {}", m.safe_to_spend);
    let _ = writeln!(
        out,
        "  Suggested split      savings {} / spending {} / investing {}",
        m.suggest_savings, m.suggest_spending, m.suggest_investing
    );
    out
}

fn render_rows(out: &mut String, title: &str, rows: &[ItemRowView], total: &str) {
    let _ = writeln!(out, "\n{title} (total {total})");
    if rows.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for row in rows {
        match &row.meta {
            Some(meta) => {
                let _ = writeln!(out, "  {}  {}  {}  [{}]", row.title, row.amount, meta, row.id);
            }
            None => {
                let _ = writeln!(out, "  {}  {}  [{}]", row.title, row.amount, row.id);
            }
        }
    }
}

pub fn render_expenses(view: &ExpenseViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} expenses, {} this month, {} overall",
        view.count, view.month_total, view.total
    );
    for row in &view.rows {
        let _ = write!(out, "  {}  {:>10}  {}", row.date, row.amount, row.category);
        if let Some(note) = &row.note {
            let _ = write!(out, "  {note}");
        }
        let _ = writeln!(out);
    }
    if !view.categories.is_empty() {
        let _ = writeln!(out, "\nBy category");
        for category in &view.categories {
            let _ = writeln!(out, "  {:<16} {}", category.category, category.amount);
        }
    }
    out
}

pub fn render_served(served: &Served) -> String {
    let source = match served.from {
        ServedFrom::Cache => "cache",
        ServedFrom::Network => "network",
        ServedFrom::Passthrough => "network (passthrough)",
    };
    let response = &served.response;
    format!(
        "{} {} from {}{}\n\n{}",
        response.status,
        response.url,
        source,
        response
            .content_type
            .as_deref()
            .map(|ct| format!(" ({ct})"))
            .unwrap_or_default(),
        String::from_utf8_lossy(&response.body)
    )
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_core::{update, BudgetState, ExpenseLedger, Msg};
    use tracker_engine::AssetResponse;

    #[test]
    fn budget_lists_rows_with_ids_and_summary() {
        let (state, _) = update(
            BudgetState::new(),
            Msg::AddDebt {
                name: String::new(),
                amount: "50".into(),
                due: String::new(),
            },
        );
        let text = render_budget(&state.view());
        let id = &state.debts[0].id;
        assert!(text.contains(&format!("Debt  $50.00  Planned by: n/a  [{id}]")), "{text}");
        assert!(text.contains("Bills (total $0.00)\n  (none)"), "{text}");
        assert!(text.contains("Safe to spend"), "{text}");
        assert!(text.contains("Recurring (total $0.00)"), "{text}");
    }

    #[test]
    fn recurring_section_hidden_when_disabled() {
        let mut state = BudgetState::new();
        state.use_recurring = false;
        let text = render_budget(&state.view());
        assert!(!text.contains("Recurring (total"), "{text}");
    }

    #[test]
    fn empty_expense_list_renders_header_only() {
        let ledger = ExpenseLedger::new();
        let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            render_expenses(&ledger.view(today)),
            "0 expenses, $0.00 this month, $0.00 overall\n"
        );
    }

    #[test]
    fn served_response_names_its_source() {
        let served = Served {
            from: ServedFrom::Cache,
            response: AssetResponse {
                url: "http://localhost:8080/index.html".into(),
                status: 200,
                content_type: Some("text/html".into()),
                body: "<p>hi</p>".into(),
            },
        };
        assert_eq!(
            render_served(&served),
            "200 http://localhost:8080/index.html from cache (text/html)\n\n<p>hi</p>"
        );
    }
}
