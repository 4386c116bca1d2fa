//! File-based commands: `sheet`, `apply`, `export`.

use std::path::Path;

use cashbook_core::{ReconciliationReport, ReconciliationService};

use super::{parse_month, parse_year};
use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::export::export_ledger;
use crate::sheet::EditSheet;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "sheet",
            "Write a month view to an editable JSON sheet",
            "sheet <year> <month> <path>",
            cmd_sheet,
        ),
        CommandEntry::new(
            "apply",
            "Apply an edited sheet back to the ledger",
            "apply <path>",
            cmd_apply,
        ),
        CommandEntry::new(
            "export",
            "Export entries to CSV",
            "export <path> [year]",
            cmd_export,
        ),
    ]
}

fn cmd_sheet(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [year, month, path] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: sheet <year> <month> <path>".into(),
        ));
    };
    let (year, month) = (parse_year(year)?, parse_month(month)?);
    let sheet = EditSheet::for_month(context.session()?.ledger(), year, month);
    sheet.write(Path::new(path))?;
    output::success(format!(
        "Edit sheet for {month} {year} written to {path} ({} rows).",
        sheet.rows.len()
    ));
    Ok(())
}

fn cmd_apply(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(CommandError::InvalidArguments("usage: apply <path>".into()));
    };
    let sheet = EditSheet::read(Path::new(path))?;
    let period = format!("{} {}", sheet.month, sheet.year);

    if context.mode() == CliMode::Interactive {
        let mut preview = context.session()?.ledger().clone();
        let planned =
            ReconciliationService::reconcile(&mut preview, &sheet.original_ids, &sheet.rows)?;
        if planned.is_noop() {
            output::info(format!("Edit sheet for {period} has no changes."));
            return Ok(());
        }
        if !context.confirm(&format!("Apply {} to {period}?", describe(&planned)))? {
            output::info("Operation cancelled.");
            return Ok(());
        }
    }

    let report = sheet.apply(context.session_mut()?)?;
    output::success(format!(
        "Applied edit sheet for {period}: {}.",
        describe(&report)
    ));
    Ok(())
}

fn describe(report: &ReconciliationReport) -> String {
    format!(
        "{} modified, {} added, {} removed, {} unchanged",
        report.modified.len(),
        report.added.len(),
        report.removed.len(),
        report.unchanged.len()
    )
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (path, year) = match args {
        [path] => (*path, None),
        [path, year] => (*path, Some(parse_year(year)?)),
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: export <path> [year]".into(),
            ))
        }
    };
    let written = export_ledger(context.session()?.ledger(), year, Path::new(path))?;
    output::success(format!("Exported {written} entries to {path}."));
    Ok(())
}
