//! Dashboard and debt reports

use clap::Args;
use serde_json::json;

use obra_core::format_currency;
use obra_runtime::{AppConfig, Session};
use obra_state::{percent_of, DebtStatus};

use super::with_session;
use crate::error::CliResult;
use crate::output::{print_json, truncate, Table};

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DebtsArgs {
    /// Only projects with outstanding debt
    #[arg(long)]
    pub pending: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn debt_label(status: DebtStatus) -> &'static str {
    match status {
        DebtStatus::Pending => "PENDING",
        DebtStatus::Settled => "SETTLED",
    }
}

pub async fn dashboard(args: DashboardArgs, config: &AppConfig) -> CliResult<()> {
    with_session(config, |session| render_dashboard(session, args.json)).await
}

fn render_dashboard(session: &Session, as_json: bool) -> CliResult<()> {
    let store = session.store();
    let reconciler = session.reconciler();
    let totals = reconciler.aggregate();
    let rows = reconciler.budget_rows();
    let recent = reconciler.recent_payments();

    if as_json {
        return print_json(&json!({
            "totalBudget": totals.total_budget,
            "totalCertificated": totals.total_certificated,
            "totalPaid": totals.total_paid,
            "totalDebt": totals.total_debt,
            "executedPercent": totals.executed_percent(),
            "budgetRows": rows
                .iter()
                .map(|r| json!({"label": r.label, "budget": r.budget, "executed": r.executed}))
                .collect::<Vec<_>>(),
            "recentPayments": recent,
        }));
    }

    println!("Total budget:     {}", format_currency(totals.total_budget));
    println!(
        "Certified:        {} ({:.1}% of total)",
        format_currency(totals.total_certificated),
        totals.executed_percent()
    );
    println!("Paid:             {}", format_currency(totals.total_paid));
    println!("Outstanding debt: {}", format_currency(totals.total_debt));
    println!("Sync:             {}", session.sync_status().label());

    if !rows.is_empty() {
        println!();
        let mut table = Table::new(["PROJECT", "BUDGET", "EXECUTED", "%"]);
        for row in &rows {
            table.row(vec![
                row.label.clone(),
                format_currency(row.budget),
                format_currency(row.executed),
                format!("{:.1}%", percent_of(row.executed, row.budget)),
            ]);
        }
        table.print();
    }

    if !recent.is_empty() {
        println!();
        println!("Recent payments");
        let mut table = Table::new(["DATE", "PROJECT", "AMOUNT", "REFERENCE"]);
        for p in recent {
            table.row(vec![
                p.date.clone(),
                truncate(store.project_name(&p.project_id), 30),
                format_currency(p.amount),
                p.reference.clone(),
            ]);
        }
        table.print();
    }
    Ok(())
}

pub async fn debts(args: DebtsArgs, config: &AppConfig) -> CliResult<()> {
    with_session(config, |session| {
        let store = session.store();
        let reconciler = session.reconciler();
        let summaries: Vec<_> = reconciler
            .summaries()
            .into_iter()
            .filter(|s| !args.pending || s.status() == DebtStatus::Pending)
            .collect();

        if args.json {
            let rows: Vec<_> = summaries
                .iter()
                .map(|s| {
                    json!({
                        "projectId": s.project.id,
                        "name": s.project.name,
                        "fileNumber": s.project.file_number,
                        "certified": s.cert_total,
                        "paid": s.paid_total,
                        "debt": s.debt,
                        "status": debt_label(s.status()),
                    })
                })
                .collect();
            return print_json(&json!({"projects": rows, "totalOwed": reconciler.total_owed()}));
        }

        if summaries.is_empty() {
            println!("No projects.");
            return Ok(());
        }

        let mut table = Table::new([
            "FILE", "PROJECT", "CONTRACTOR", "CERTIFIED", "PAID", "DEBT", "STATUS",
        ]);
        for s in &summaries {
            table.row(vec![
                s.project.file_number.clone(),
                truncate(&s.project.name, 30),
                truncate(store.contractor_name(&s.project.contractor_id), 30),
                format_currency(s.cert_total),
                format_currency(s.paid_total),
                format_currency(s.debt),
                debt_label(s.status()).to_string(),
            ]);
        }
        table.print();
        println!();
        println!("Total owed: {}", format_currency(reconciler.total_owed()));
        Ok(())
    })
    .await
}
