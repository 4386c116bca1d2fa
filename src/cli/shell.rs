//! Line input for the shell: tokenizing, the interactive editor and the stdin
//! script runner. Both front ends feed the same dispatcher.

use std::io::{self, BufRead};

use cashbook_config::Config;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;

/// When set, commands are read from stdin line by line without a prompt.
pub const SCRIPT_ENV: &str = "CASHBOOK_CLI_SCRIPT";

const LEDGER_ACTIONS: &[&str] = &["new", "load", "save", "list", "backups"];
const CONFIG_ACTIONS: &[&str] = &["show", "set"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => {
            let mut input = EditorInput::new(&context)?;
            drive(&mut context, |context| input.next_line(context))
        }
        CliMode::Script => {
            let mut lines = io::stdin().lock().lines();
            drive(&mut context, |_| lines.next().transpose().map_err(CliError::from))
        }
    }
}

/// Dispatches lines until input runs out or a command asks to exit.
/// Command failures are reported and never stop the loop.
fn drive<F>(context: &mut ShellContext, mut next_line: F) -> Result<(), CliError>
where
    F: FnMut(&ShellContext) -> Result<Option<String>, CliError>,
{
    while context.running {
        let Some(line) = next_line(&*context)? else {
            break;
        };
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => context.running = false,
            Err(err) => context.report_error(err),
        }
    }
    Ok(())
}

/// Runs one line. Blank lines and lines starting with `#` are skipped.
pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(LoopControl::Continue);
    }
    let tokens = parse_command_line(line)
        .map_err(|err| CommandError::InvalidArguments(format!("cannot parse `{line}`: {err}")))?;
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.dispatch(&raw.to_lowercase(), raw, &args)
}

/// Splits a line with shell quoting rules. Words starting with `#` are kept
/// as arguments, so entry ids like `#3` survive tokenizing.
pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, shell_words::ParseError> {
    shell_words::split(&escape_hash_words(input))
}

/// Backslash-escapes `#` where shell-words would open a comment: at the
/// start of an unquoted word.
fn escape_hash_words(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    let mut quote: Option<char> = None;
    let mut word_start = true;
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if let Some(open) = quote {
            escaped.push(c);
            if c == open {
                quote = None;
            } else if c == '\\' && open == '"' {
                escaped.extend(chars.next());
            }
            word_start = false;
            continue;
        }
        if c == '#' && word_start {
            escaped.push('\\');
        }
        escaped.push(c);
        match c {
            '\'' | '"' => quote = Some(c),
            '\\' => escaped.extend(chars.next()),
            _ => {}
        }
        word_start = matches!(c, ' ' | '\t' | '\n');
    }
    escaped
}

struct EditorInput {
    editor: Editor<CommandHelper, DefaultHistory>,
}

impl EditorInput {
    fn new(context: &ShellContext) -> Result<Self, CliError> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(CommandHelper::new(context.command_names())));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self { editor })
    }

    /// `None` ends the session: end of input, or a confirmed Ctrl-C.
    fn next_line(&mut self, context: &ShellContext) -> Result<Option<String>, CliError> {
        loop {
            match self.editor.readline(&context.prompt()) {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.trim());
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => {
                    if context.confirm_exit()? {
                        return Ok(None);
                    }
                }
                Err(ReadlineError::Eof) => {
                    output::info("Exiting shell.");
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Completes command names, `ledger`/`config` actions and config keys.
struct CommandHelper {
    commands: Vec<&'static str>,
}

impl CommandHelper {
    fn new(mut commands: Vec<&'static str>) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self { commands }
    }

    fn candidates(&self, prefix: &str) -> (usize, Vec<String>) {
        let prefix = prefix.to_ascii_lowercase();
        let start = prefix.rfind(char::is_whitespace).map_or(0, |idx| idx + 1);
        let before: Vec<&str> = prefix[..start].split_whitespace().collect();
        let pool: &[&str] = match before.as_slice() {
            [] | ["help"] => self.commands.as_slice(),
            ["ledger"] => LEDGER_ACTIONS,
            ["config"] => CONFIG_ACTIONS,
            ["config", "set"] => Config::KEYS,
            _ => &[],
        };
        let needle = &prefix[start..];
        let matches = pool
            .iter()
            .filter(|name| name.starts_with(needle))
            .map(|name| name.to_string())
            .collect();
        (start, matches)
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, names) = self.candidates(&line[..pos]);
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}
