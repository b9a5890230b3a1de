//! Core CLI loop, dispatch, and shell context helpers.

use std::{collections::HashMap, io};

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;

use crate::{
    config::{Config, ConfigManager},
    core::ledger_manager::LedgerManager,
    core::services::ServiceError,
    currency::AmountFormat,
    domain::Transaction,
    errors::LedgerError,
    storage::JsonFileStore,
};

use super::commands;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};

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

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: LedgerManager,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub running: bool,
}

impl ShellContext {
    /// Opens the file store under the configured data directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let store = JsonFileStore::new(config_manager.data_dir(&config))?;
        let manager = LedgerManager::load(Box::new(store))?;
        Ok(Self::with_parts(mode, manager, config_manager, config))
    }

    pub fn with_parts(
        mode: CliMode,
        manager: LedgerManager,
        config_manager: ConfigManager,
        config: Config,
    ) -> Self {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        apply_config(&config, mode);
        Self {
            mode,
            registry,
            manager,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            running: true,
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        format!("tally [{}]> ", self.manager.settings().mode)
    }

    pub(crate) fn is_interactive(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub(crate) fn amounts(&self) -> AmountFormat {
        AmountFormat::from_config(&self.config)
    }

    /// Parses a typed amount with the configured locale's separators.
    pub(crate) fn parse_amount(&self, input: &str) -> Result<f64, CommandError> {
        self.amounts()
            .parse(input)
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))
    }

    /// Saves the config and re-applies its output preferences.
    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        apply_config(&self.config, self.mode);
        Ok(())
    }

    /// Finds one transaction by full id or unique id prefix.
    pub(crate) fn resolve_transaction(&self, needle: &str) -> Result<Transaction, CommandError> {
        let needle = needle.trim();
        if let Some(txn) = self.manager.ledger().transaction(needle) {
            return Ok(txn.clone());
        }
        let matches: Vec<&Transaction> = self
            .manager
            .transactions()
            .iter()
            .filter(|txn| !needle.is_empty() && txn.id.starts_with(needle))
            .collect();
        match matches.as_slice() {
            [single] => Ok((*single).clone()),
            [] => Err(CommandError::InvalidArguments(format!(
                "no transaction matches `{needle}`"
            ))),
            _ => Err(CommandError::InvalidArguments(format!(
                "`{needle}` matches {} transactions; use more characters",
                matches.len()
            ))),
        }
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

    /// Tokenizes one input line and runs it. An exit request stops the session.
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = shell_words::split(line).map_err(|err| {
            CommandError::InvalidArguments(format!("could not parse input: {err}"))
        })?;
        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        let control = self.dispatch(&raw.to_lowercase(), raw, &args)?;
        if control == LoopControl::Exit {
            self.running = false;
        }
        Ok(control)
    }

    /// Category names of both types, for completion.
    pub(crate) fn category_names(&self) -> Vec<String> {
        let book = self.manager.categories();
        book.income.iter().chain(book.expense.iter()).cloned().collect()
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_hint(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Ledger(err) if err.is_persistence() => {
                self.print_error(&format!("Could not save changes: {err}"));
                self.print_hint("Nothing was changed. Check free space and permissions, then retry.");
                Ok(())
            }
            CommandError::Ledger(LedgerError::InvalidBackup(message)) => {
                self.print_error(&format!("Import failed: {message}"));
                self.print_hint("Existing data was left untouched.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }
}

/// Script mode and `ui_color_enabled = false` both switch to plain output.
fn apply_config(config: &Config, mode: CliMode) {
    let color = config.ui_color_enabled && mode == CliMode::Interactive;
    output::set_preferences(OutputPreferences {
        color,
        plain_mode: mode == CliMode::Script,
    });
}

/// Positional arguments plus `--flag value` / `--switch` options.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    flags: HashMap<&'static str, Option<&'a str>>,
}

impl<'a> ParsedArgs<'a> {
    pub fn parse(
        args: &[&'a str],
        value_flags: &[&'static str],
        switches: &[&'static str],
    ) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positional.push(arg);
                continue;
            };
            if let Some(flag) = value_flags.iter().find(|flag| **flag == name) {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("`--{name}` needs a value"))
                })?;
                parsed.flags.insert(*flag, Some(value));
            } else if let Some(flag) = switches.iter().find(|flag| **flag == name) {
                parsed.flags.insert(*flag, None);
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `--{name}`"
                )));
            }
        }
        Ok(parsed)
    }

    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.flags.get(name).copied().flatten()
    }

    pub fn has(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }
}

pub(crate) fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Command(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Ledger(LedgerError::Validation(message)) | ServiceError::Invalid(message) => {
                CommandError::InvalidArguments(message)
            }
            ServiceError::Ledger(err) => CommandError::Ledger(err),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn test_context() -> (ShellContext, tempfile::TempDir) {
    use crate::core::time::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    let dir = tempfile::tempdir().expect("temp dir");
    let config_manager =
        ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("config manager");
    let clock = FixedClock(
        Utc.with_ymd_and_hms(2025, 7, 13, 9, 0, 0)
            .single()
            .expect("valid instant"),
    );
    let manager = LedgerManager::load_with_clock(Box::new(MemoryStore::new()), Box::new(clock))
        .expect("manager");
    let context = ShellContext::with_parts(CliMode::Script, manager, config_manager, Config::default());
    (context, dir)
}

#[cfg(test)]
pub(crate) fn process_script(context: &mut ShellContext, lines: &[&str]) -> Result<(), CliError> {
    for line in lines {
        match context.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryMode, TransactionType};

    #[test]
    fn quoted_arguments_stay_together() {
        let (mut context, _dir) = test_context();
        process_script(&mut context, &["add expense 12 \"Other Expenses\" \"Corner shop\""])
            .unwrap();
        let txn = &context.manager.transactions()[0];
        assert_eq!(txn.category, "Other Expenses");
        assert_eq!(txn.description, "Corner shop");
        assert_eq!(
            context.process_line("add \"unterminated").unwrap_err().to_string(),
            "could not parse input: missing closing quote"
        );
    }

    #[test]
    fn parsed_args_split_flags_from_positionals() {
        let args = ["income", "100", "--month", "2025-06", "Salary", "--yes"];
        let parsed = ParsedArgs::parse(&args, &["month"], &["yes"]).unwrap();
        assert_eq!(parsed.positional, vec!["income", "100", "Salary"]);
        assert_eq!(parsed.value("month"), Some("2025-06"));
        assert!(parsed.has("yes"));
        assert!(ParsedArgs::parse(&["--bogus"], &["month"], &[]).is_err());
        assert!(ParsedArgs::parse(&["--month"], &["month"], &[]).is_err());
    }

    #[test]
    fn script_adds_and_removes_transactions() {
        let (mut context, _dir) = test_context();
        process_script(
            &mut context,
            &[
                "add income 5000 Salary \"July payroll\" --month 2025-07",
                "add expense 500 Food Groceries",
                "settings mode professional",
            ],
        )
        .unwrap();
        assert_eq!(context.manager.transactions().len(), 2);
        assert_eq!(context.manager.settings().mode, EntryMode::Professional);

        let id = context.manager.transactions()[1].id.clone();
        process_script(&mut context, &[&format!("remove {}", short_id(&id))]).unwrap();
        assert_eq!(context.manager.transactions().len(), 1);
        assert_eq!(context.manager.transactions()[0].kind, TransactionType::Income);
    }

    #[test]
    fn failing_command_keeps_shell_running() {
        let (mut context, _dir) = test_context();
        process_script(
            &mut context,
            &["add expense 10 Nonexistent \"Mystery\"", "bogus", "add expense 10 Food Tea"],
        )
        .unwrap();
        assert!(context.running);
        assert_eq!(context.manager.transactions().len(), 1);
    }

    #[test]
    fn exit_stops_processing() {
        let (mut context, _dir) = test_context();
        process_script(&mut context, &["exit", "add expense 10 Food Tea"]).unwrap();
        assert!(context.manager.transactions().is_empty());
    }

    #[test]
    fn category_and_config_commands_update_state() {
        let (mut context, _dir) = test_context();
        process_script(
            &mut context,
            &[
                "category add expense Pets",
                "category rename expense pets \"Pet care\"",
                "config set currency eur",
                "config set recent_limit 3",
                "settings tax 21",
            ],
        )
        .unwrap();
        assert!(context
            .manager
            .categories()
            .contains(TransactionType::Expense, "Pet care"));
        assert_eq!(context.config.currency, "EUR");
        assert_eq!(context.config_manager.load().unwrap().recent_limit, 3);
        assert_eq!(context.manager.settings().tax_percentage, 21.0);

        process_script(&mut context, &["settings tax -4", "config set color maybe"]).unwrap();
        assert_eq!(context.manager.settings().tax_percentage, 21.0);
        assert!(context.config.ui_color_enabled);
    }

    #[test]
    fn amounts_follow_locale_separators() {
        let (mut context, _dir) = test_context();
        process_script(&mut context, &["add expense 12,50 Food Lunch"]).unwrap();
        assert!(context.manager.transactions().is_empty());

        process_script(
            &mut context,
            &[
                "config set locale es-MX",
                "add expense 12,50 Food Almuerzo",
                "add income 1.234,5 Salary Quincena",
            ],
        )
        .unwrap();
        let amounts: Vec<f64> = context
            .manager
            .transactions()
            .iter()
            .map(|txn| txn.amount)
            .collect();
        assert_eq!(amounts.len(), 2);
        assert!(amounts.contains(&12.5));
        assert!(amounts.contains(&1234.5));
    }

    #[test]
    fn clear_in_script_mode_needs_flag() {
        let (mut context, _dir) = test_context();
        process_script(&mut context, &["add income 20 Sales Raffle", "clear"]).unwrap();
        assert_eq!(context.manager.transactions().len(), 1);
        process_script(&mut context, &["clear --yes"]).unwrap();
        assert!(context.manager.transactions().is_empty());
    }

    #[test]
    fn resolve_transaction_rejects_unknown_prefix() {
        let (context, _dir) = test_context();
        assert!(context.resolve_transaction("zzz").is_err());
    }
}
