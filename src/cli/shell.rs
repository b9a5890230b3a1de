use std::io::{self, BufRead};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Context as ReadlineContext, Editor, Helper,
};

use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::output::info as output_info;

/// Set to any value to read commands from stdin without prompts.
pub const SCRIPT_ENV: &str = "TALLY_CLI_SCRIPT";

const HISTORY_FILE: &str = "history.txt";

const TYPES: &[&str] = &["income", "expense"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(ShellHelper::new(context)));
    let history = context.config_manager.base().join(HISTORY_FILE);
    editor.load_history(&history).ok();
    output_info("Type `help` to list commands, `exit` to quit.");

    while context.running {
        if let Some(helper) = editor.helper_mut() {
            helper.categories = context.category_names();
        }
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if run_line(context, trimmed)? == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if let Err(err) = editor.save_history(&history) {
        tracing::debug!(error = %err, "could not save shell history");
    }
    output_info("Bye.");
    Ok(())
}

/// Reads stdin line by line; blank lines and `#` comments are skipped.
fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if run_line(context, trimmed)? == LoopControl::Exit || !context.running {
            break;
        }
    }
    Ok(())
}

/// Command failures are reported and the session continues.
fn run_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    match context.process_line(line) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

/// Completes command names, subcommands, transaction types and category names.
struct ShellHelper {
    commands: Vec<String>,
    categories: Vec<String>,
}

impl ShellHelper {
    fn new(context: &ShellContext) -> Self {
        let mut commands: Vec<String> = context
            .command_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        commands.sort();
        Self {
            commands,
            categories: context.category_names(),
        }
    }

    /// Candidates for the word at position `words.len() - 1` of the line.
    fn candidates(&self, words: &[&str]) -> Vec<String> {
        let fixed = |items: &[&str]| -> Vec<String> {
            items.iter().map(|item| item.to_string()).collect()
        };
        let command = words.first().map(|word| word.to_lowercase()).unwrap_or_default();
        let sub = words.get(1).map(|word| word.to_lowercase()).unwrap_or_default();
        match (command.as_str(), words.len()) {
            (_, 0 | 1) => self.commands.clone(),
            ("help", 2) => self.commands.clone(),
            ("add" | "stats", 2) => fixed(TYPES),
            ("add", 4) => self.categories.clone(),
            ("tax", 2) => fixed(&["base", "tax", "total"]),
            ("settings", 2) => fixed(&["show", "mode", "tax"]),
            ("settings", 3) if sub == "mode" => fixed(&["basic", "professional"]),
            ("category", 2) => fixed(&["list", "add", "rename", "remove", "reset"]),
            ("category", 3) if sub != "reset" => fixed(TYPES),
            ("category", 4) if sub == "rename" || sub == "remove" => self.categories.clone(),
            ("config", 2) => fixed(&["show", "set"]),
            ("config", 3) if sub == "set" => fixed(&[
                "locale",
                "currency",
                "color",
                "recent_limit",
                "data_dir",
            ]),
            ("history", _) => fixed(&["--from", "--to", "--type", "--category"]),
            ("clear", 2) => fixed(&["--yes"]),
            _ => Vec::new(),
        }
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let mut words: Vec<&str> = prefix[..start].split_whitespace().collect();
        let needle = &prefix[start..];
        words.push(needle);

        let needle = needle.to_lowercase();
        let candidates = self
            .candidates(&words)
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(&needle))
            .map(|candidate| Pair {
                replacement: if candidate.contains(' ') {
                    format!("\"{candidate}\"")
                } else {
                    candidate.clone()
                },
                display: candidate,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
