//! Reporting commands: `summary` and `trend`.

use chrono::Datelike;

use cashbook_core::{PeriodFilter, SummaryService};
use cashbook_domain::PeriodSummary;

use super::{parse_scope, parse_year};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Align};
use crate::cli::registry::CommandEntry;
use crate::utils::format::{format_percent, MoneyFormat};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summary",
            "Planned vs. realized totals for a month or a year",
            "summary [year [month]]",
            cmd_summary,
        ),
        CommandEntry::new(
            "trend",
            "Month-by-month totals for a year",
            "trend [year] [--all]",
            cmd_trend,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let scope = parse_scope(context, args)?;
    let money = context.money();
    let ledger = context.session()?.ledger();
    let summary = SummaryService::summarize(&PeriodFilter::select(ledger, scope));

    output::section(format!("Summary for {scope}"));
    print_summary(&summary, &money);
    Ok(())
}

fn print_summary(summary: &PeriodSummary, money: &MoneyFormat) {
    let totals = &summary.totals;
    let lines = [
        ("Planned income", totals.planned_income),
        ("Realized income", totals.realized_income),
        ("Pending income", totals.pending_income()),
        ("Planned expense", totals.planned_expense),
        ("Realized expense", totals.realized_expense),
        ("Pending expense", totals.pending_expense()),
        ("Net cash", totals.net_cash()),
        ("Expected balance", totals.planned_net()),
    ];
    for (label, value) in lines {
        output::info(format!("  {label:<17}: {:>20}", money.amount(value)));
    }
    if let Some(ratio) = SummaryService::settlement_ratio(totals) {
        output::info(format!("  {:<17}: {:>20}", "Expenses settled", format_percent(ratio)));
    }
    output::info(format!("  {:<17}: {:>20}", "Entries", summary.entry_count));
    for warning in &summary.warnings {
        output::warning(format!("Consistency check: {warning}"));
    }
}

fn cmd_trend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let full = args.iter().any(|arg| *arg == "--all");
    let positional: Vec<&str> = args.iter().copied().filter(|arg| *arg != "--all").collect();
    let year = match positional.as_slice() {
        [] => context.today().year(),
        [year] => parse_year(year)?,
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: trend [year] [--all]".into(),
            ))
        }
    };
    let money = context.money();
    let ledger = context.session()?.ledger();
    let trend = if full {
        SummaryService::monthly_trend_full(ledger, year)
    } else {
        SummaryService::monthly_trend(ledger, year)
    };
    if trend.is_empty() {
        output::info(format!("No entries for {year}."));
        return Ok(());
    }

    output::section(format!("Monthly trend for {year}"));
    let rows: Vec<Vec<String>> = trend
        .iter()
        .map(|point| {
            let totals = &point.summary.totals;
            vec![
                point.month.to_string(),
                money.amount(totals.planned_income),
                money.amount(totals.realized_income),
                money.amount(totals.planned_expense),
                money.amount(totals.realized_expense),
                money.amount(totals.net_cash()),
            ]
        })
        .collect();
    output::table(
        &[
            ("Month", Align::Left),
            ("Planned income", Align::Right),
            ("Realized income", Align::Right),
            ("Planned expense", Align::Right),
            ("Realized expense", Align::Right),
            ("Net cash", Align::Right),
        ],
        &rows,
    );
    for point in &trend {
        for warning in &point.summary.warnings {
            output::warning(format!("{}: {warning}", point.month));
        }
    }
    Ok(())
}
