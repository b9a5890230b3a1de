use std::path::PathBuf;

use crate::cli::core::{CommandError, CommandResult, ParsedArgs, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::storage::backup::default_file_name;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write a JSON backup of all data",
            "export [path]",
            cmd_export,
        ),
        CommandEntry::new(
            "import",
            "Replace data with the sections found in a JSON backup",
            "import <path>",
            cmd_import,
        ),
        CommandEntry::new(
            "clear",
            "Delete every transaction and restore defaults",
            "clear [--yes]",
            cmd_clear,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = match args.first() {
        Some(raw) => PathBuf::from(raw),
        None => PathBuf::from(default_file_name(context.manager.clock().today())),
    };
    context.manager.export_to_path(&path)?;
    io::print_success(format!(
        "Exported {} transaction(s) to {}.",
        context.manager.transactions().len(),
        path.display()
    ));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args
        .first()
        .map(PathBuf::from)
        .ok_or_else(|| CommandError::InvalidArguments("usage: import <path>".into()))?;
    if context.is_interactive()
        && !io::confirm_action(
            &context.theme,
            "Importing replaces the sections present in the file. Continue?",
            false,
        )?
    {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let report = context.manager.import_from_path(&path)?;
    io::print_success(format!("Imported backup from {}.", path.display()));
    if let Some(count) = report.transactions {
        io::print_info(format!("  Transactions: {count}"));
    }
    if let Some(count) = report.categories {
        io::print_info(format!("  Categories  : {count}"));
    }
    if report.settings {
        io::print_info("  Settings    : replaced");
    }
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    let confirmed = parsed.has("yes")
        || (context.is_interactive()
            && io::confirm_action(
                &context.theme,
                "Delete all transactions and reset categories and settings?",
                false,
            )?);
    if !confirmed {
        if context.is_interactive() {
            io::print_info("Operation cancelled.");
            return Ok(());
        }
        return Err(CommandError::InvalidArguments(
            "refusing to clear without `--yes` in script mode".into(),
        ));
    }
    context.manager.clear_all()?;
    io::print_success("All data cleared.");
    Ok(())
}
