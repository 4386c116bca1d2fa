use cashbook_config::Config;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Align};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        "config [show|set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => show_config(context),
        [sub] if sub.eq_ignore_ascii_case("show") => show_config(context),
        [sub, key, value @ ..] if sub.eq_ignore_ascii_case("set") && !value.is_empty() => {
            let value = value.join(" ");
            context.set_config_value(key, value.trim())?;
            output::success("Configuration updated.");
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(format!(
            "usage: config set <{}> <value>",
            Config::KEYS.join("|")
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    output::section("Configuration");
    let rows = Config::KEYS
        .iter()
        .map(|key| Ok(vec![key.to_string(), context.config.value_of(key)?]))
        .collect::<Result<Vec<_>, CommandError>>()?;
    output::table(&[("Key", Align::Left), ("Value", Align::Left)], &rows);
    output::info(format!(
        "Stored in {}",
        context.config_manager.config_path().display()
    ));
    Ok(())
}
