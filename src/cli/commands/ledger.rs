//! `ledger` command: create, open, save and inspect named ledgers.

use std::{path::Path, sync::Arc};

use cashbook_core::{LedgerSession, LedgerStorage};
use cashbook_storage_json::save_ledger_to_path;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Align};
use crate::cli::registry::CommandEntry;

const USAGE: &str = "ledger <new <name>|load <name>|save [path]|list|backups>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "ledger",
        "Create, load, save and list ledgers",
        USAGE,
        cmd_ledger,
    )]
}

fn cmd_ledger(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {USAGE}")));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "new" => handle_new(context, rest),
        "load" => handle_load(context, rest),
        "save" => handle_save(context, rest),
        "list" => handle_list(context),
        "backups" => handle_backups(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown ledger subcommand `{other}`. Available: new, load, save, list, backups"
        ))),
    }
}

fn ledger_name(args: &[&str], action: &str) -> Result<String, CommandError> {
    let name = args.join(" ");
    if name.trim().is_empty() {
        return Err(CommandError::InvalidArguments(format!(
            "usage: ledger {action} <name>"
        )));
    }
    Ok(name.trim().to_string())
}

fn handle_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = ledger_name(args, "new")?;
    if context.storage.contains_ledger(&name)? {
        return Err(CommandError::InvalidArguments(format!(
            "ledger `{name}` already exists. Use `ledger load {name}` to open it."
        )));
    }
    let session = LedgerSession::create(Arc::clone(&context.storage), &name)?;
    context.activate(session)?;
    output::success(format!("New ledger `{name}` created."));
    Ok(())
}

fn handle_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = ledger_name(args, "load")?;
    if !context.storage.contains_ledger(&name)? {
        return Err(CommandError::InvalidArguments(format!(
            "ledger `{name}` not found. Use `ledger list` to see stored ledgers."
        )));
    }
    let session = LedgerSession::open(Arc::clone(&context.storage), &name)?;
    let count = session.ledger().len();
    context.activate(session)?;
    output::success(format!("Ledger `{name}` loaded ({count} entries)."));
    Ok(())
}

fn handle_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = context.session()?;
    match args.first() {
        Some(path) => {
            save_ledger_to_path(session.ledger(), Path::new(path))?;
            output::success(format!("Ledger `{}` written to {path}.", session.name()));
        }
        None => {
            session.save()?;
            output::success(format!("Ledger `{}` saved.", session.name()));
        }
    }
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let ledgers = context.storage.list_ledger_metadata()?;
    if ledgers.is_empty() {
        output::info("No ledgers stored yet.");
        return Ok(());
    }
    output::section("Stored ledgers");
    let rows: Vec<Vec<String>> = ledgers
        .iter()
        .map(|meta| {
            vec![
                meta.name.clone(),
                meta.entry_count.to_string(),
                meta.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    output::table(
        &[
            ("Name", Align::Left),
            ("Entries", Align::Right),
            ("Updated (UTC)", Align::Left),
        ],
        &rows,
    );
    Ok(())
}

fn handle_backups(context: &mut ShellContext) -> CommandResult {
    let name = context.session()?.name().to_string();
    let backups = context.storage.list_backups(&name)?;
    if backups.is_empty() {
        output::info(format!("No backups for `{name}` yet."));
        return Ok(());
    }
    output::section(format!("Backups of `{name}`"));
    let rows: Vec<Vec<String>> = backups
        .iter()
        .map(|backup| {
            vec![
                backup.id.clone(),
                backup.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                backup.size_bytes.to_string(),
            ]
        })
        .collect();
    output::table(
        &[
            ("File", Align::Left),
            ("Created (UTC)", Align::Left),
            ("Bytes", Align::Right),
        ],
        &rows,
    );
    Ok(())
}
