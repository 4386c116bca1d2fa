//! Shell state, dispatch, and the error types shared by every command.

use std::{io, path::PathBuf, sync::Arc};

use cashbook_config::{Config, ConfigError, ConfigManager};
use cashbook_core::{Clock, CoreError, LedgerSession, LedgerStorage};
use cashbook_storage_json::{JsonLedgerStorage, StoragePaths};
use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;
use tracing::warn;

use super::commands;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};
use crate::sheet::SheetError;
use crate::utils::{self, format::MoneyFormat, SystemClock};

pub type Session = LedgerSession<Arc<JsonLedgerStorage>>;

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("No ledger loaded. Use `ledger new <name>` or `ledger load <name>` first.")]
    NoLedger,
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Malformed edit sheet: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<SheetError> for CommandError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::Io(err) => CommandError::Io(err),
            SheetError::Serde(err) => CommandError::Serde(err),
        }
    }
}

/// Failures that stop the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("readline failure: {0}")]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) home: PathBuf,
    pub(crate) config_manager: ConfigManager,
    pub(crate) config: Config,
    pub(crate) storage: Arc<JsonLedgerStorage>,
    pub(crate) session: Option<Session>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_home(mode, utils::app_home())
    }

    /// Builds a shell rooted at `home`: `config.json` plus the ledger and
    /// backup directories the configuration points at.
    pub fn with_home(mode: CliMode, home: PathBuf) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(&home)?;
        let config = config_manager.load()?;
        let storage = Arc::new(build_storage(&config, &home)?);
        output::set_color_enabled(config.ui_color_enabled && mode == CliMode::Interactive);

        let mut context = Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            home,
            config_manager,
            config,
            storage,
            session: None,
            clock: Box::new(SystemClock),
            running: true,
        };
        context.auto_load_last();
        Ok(context)
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(name) = self.config.last_opened_ledger.clone() else {
            return;
        };
        match self.storage.contains_ledger(&name) {
            Ok(true) => match LedgerSession::open(Arc::clone(&self.storage), &name) {
                Ok(session) => {
                    output::success(format!("Automatically loaded last ledger `{name}`."));
                    self.session = Some(session);
                }
                Err(err) => warn!(ledger = %name, error = %err, "could not reopen last ledger"),
            },
            Ok(false) => {}
            Err(err) => warn!(error = %err, "could not inspect ledger store"),
        }
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn prompt(&self) -> String {
        match &self.session {
            Some(session) => format!("cashbook [{}]> ", session.name()),
            None => "cashbook> ".into(),
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::NoLedger => {
                output::error(CommandError::NoLedger);
                output::hint("Try `ledger new Household` to get started.");
            }
            other => output::error(other),
        }
    }

    /// Asks a yes/no question; scripts always proceed.
    pub(crate) fn confirm(&self, question: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .default(true)
            .interact()?)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        self.confirm("Exit shell?").map_err(CliError::from)
    }

    pub(crate) fn session(&self) -> Result<&Session, CommandError> {
        self.session.as_ref().ok_or(CommandError::NoLedger)
    }

    pub(crate) fn session_mut(&mut self) -> Result<&mut Session, CommandError> {
        self.session.as_mut().ok_or(CommandError::NoLedger)
    }

    /// Makes `session` current and remembers its name for the next start.
    pub(crate) fn activate(&mut self, session: Session) -> CommandResult {
        self.config.last_opened_ledger = Some(session.name().to_string());
        self.config_manager.save(&self.config)?;
        self.session = Some(session);
        Ok(())
    }

    pub(crate) fn money(&self) -> MoneyFormat {
        MoneyFormat::new(self.config.currency.clone(), self.config.currency_precision)
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn set_config_value(&mut self, key: &str, value: &str) -> CommandResult {
        self.config = self.config_manager.set(key, value)?;
        output::set_color_enabled(self.config.ui_color_enabled && self.mode == CliMode::Interactive);
        if matches!(key, "ledger_root" | "backup_root" | "backup_retention") {
            self.storage = Arc::new(build_storage(&self.config, &self.home)?);
            if self.session.is_some() {
                output::info("Storage settings apply from the next `ledger load`.");
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        crate::cli::shell::handle_line(self, line)
    }
}

fn build_storage(config: &Config, home: &std::path::Path) -> Result<JsonLedgerStorage, CoreError> {
    JsonLedgerStorage::with_retention(
        StoragePaths {
            ledger_root: config.resolve_ledger_root(home),
            backup_root: config.resolve_backup_root(home),
        },
        config.backup_retention,
    )
}

#[cfg(test)]
pub(crate) fn process_script(home: PathBuf, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut context = ShellContext::with_home(CliMode::Script, home)?;
    for line in lines {
        match context.process_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(context)
}
