pub mod config;
pub mod entry;
pub mod ledger;
pub mod report;
pub mod sheet;
pub mod system;

use std::str::FromStr;

use cashbook_core::PeriodScope;
use cashbook_domain::{EntryId, Month};
use chrono::Datelike;

use crate::cli::core::{CommandError, ShellContext};
use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(ledger::definitions());
    commands.extend(entry::definitions());
    commands.extend(report::definitions());
    commands.extend(sheet::definitions());
    commands.extend(config::definitions());
    commands
}

pub(crate) fn parse_year(raw: &str) -> Result<i32, CommandError> {
    raw.parse::<i32>()
        .ok()
        .filter(|year| (1900..=9999).contains(year))
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid year `{raw}`")))
}

pub(crate) fn parse_month(raw: &str) -> Result<Month, CommandError> {
    Month::from_str(raw).map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

/// Accepts `3` or `#3`.
pub(crate) fn parse_entry_id(raw: &str) -> Result<EntryId, CommandError> {
    raw.trim_start_matches('#')
        .parse::<u64>()
        .map(EntryId)
        .map_err(|_| CommandError::InvalidArguments(format!("invalid entry id `{raw}`")))
}

/// `[]` is the current month, `[year]` a whole year, `[year, month]` one month.
pub(crate) fn parse_scope(context: &ShellContext, args: &[&str]) -> Result<PeriodScope, CommandError> {
    match args {
        [] => {
            let today = context.today();
            Ok(PeriodScope::month(today.year(), Month::of(today)))
        }
        [year] => Ok(PeriodScope::year(parse_year(year)?)),
        [year, month] => Ok(PeriodScope::month(parse_year(year)?, parse_month(month)?)),
        _ => Err(CommandError::InvalidArguments(
            "expected at most a year and a month".into(),
        )),
    }
}
