//! Entry commands: `add`, `settle`, `list`.

use cashbook_core::{EntryDraft, PeriodFilter};
use cashbook_domain::EntryId;

use super::{parse_entry_id, parse_scope};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Align};
use crate::cli::registry::CommandEntry;

const ADD_USAGE: &str =
    "add <date|today> <income|expense> <amount> <description...> [--status <pending|settled>] [--installments <n>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Add an entry, optionally repeated monthly",
            ADD_USAGE,
            cmd_add,
        ),
        CommandEntry::new(
            "settle",
            "Mark entries as settled",
            "settle <id> [id...]",
            cmd_settle,
        ),
        CommandEntry::new(
            "list",
            "List entries of a month or a year",
            "list [year [month]]",
            cmd_list,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut positional = Vec::new();
    let mut status = None;
    let mut installments = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--status" | "-s" => status = Some(flag_value(&mut iter, "--status")?.to_string()),
            "--installments" | "-n" => {
                let raw = flag_value(&mut iter, "--installments")?;
                let count = raw.parse::<u32>().map_err(|_| {
                    CommandError::InvalidArguments(format!("invalid installment count `{raw}`"))
                })?;
                installments = Some(count);
            }
            other => positional.push(other),
        }
    }

    let [date, kind, amount, description @ ..] = positional.as_slice() else {
        return Err(CommandError::InvalidArguments(format!("usage: {ADD_USAGE}")));
    };
    let date = if date.eq_ignore_ascii_case("today") {
        context.today().format("%Y-%m-%d").to_string()
    } else {
        date.to_string()
    };
    let status = status.unwrap_or_else(|| context.config.default_status.clone());

    let mut draft = EntryDraft::new(date, description.join(" "), *kind, *amount).with_status(status);
    if let Some(count) = installments {
        draft = draft.with_installments(count);
    }

    let ids = context.session_mut()?.add(&draft)?;
    let listed = ids
        .iter()
        .map(EntryId::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    match ids.len() {
        1 => output::success(format!("Added entry {listed}.")),
        n => output::success(format!("Added {n} entries: {listed}.")),
    }
    Ok(())
}

fn flag_value<'a>(
    iter: &mut std::slice::Iter<'_, &'a str>,
    flag: &str,
) -> Result<&'a str, CommandError> {
    iter.next()
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("{flag} needs a value")))
}

fn cmd_settle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("usage: settle <id> [id...]".into()));
    }
    let ids = args
        .iter()
        .map(|raw| parse_entry_id(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let session = context.session_mut()?;
    for id in ids {
        if session.settle(id)? {
            output::success(format!("Entry {id} settled."));
        } else {
            output::info(format!("Entry {id} is already settled."));
        }
    }
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let scope = parse_scope(context, args)?;
    let money = context.money();
    let ledger = context.session()?.ledger();
    let view = PeriodFilter::select(ledger, scope);
    if view.is_empty() {
        output::info(format!("No entries for {scope}."));
        return Ok(());
    }

    output::section(format!("Entries for {scope}"));
    let rows: Vec<Vec<String>> = view
        .iter()
        .map(|row| {
            vec![
                row.id.to_string(),
                row.entry.date.format("%Y-%m-%d").to_string(),
                row.entry.description.clone(),
                row.entry.kind.to_string(),
                money.amount(row.entry.amount),
                row.entry.status.to_string(),
            ]
        })
        .collect();
    output::table(
        &[
            ("Id", Align::Right),
            ("Date", Align::Left),
            ("Description", Align::Left),
            ("Kind", Align::Left),
            ("Amount", Align::Right),
            ("Status", Align::Left),
        ],
        &rows,
    );
    Ok(())
}
