use crate::cli::commands::transaction::parse_kind;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::core::services::CategoryService;
use crate::domain::TransactionType;

const USAGE: &str = "category [list [income|expense]|add <type> <name>|rename <type> <old> <new>|remove <type> <name>|reset]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "category",
        "List and edit category tags",
        USAGE,
        cmd_category,
    )]
}

fn usage() -> CommandError {
    CommandError::InvalidArguments(format!("usage: {USAGE}"))
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list(context, None);
    };
    match action.to_lowercase().as_str() {
        "list" => {
            let kind = args.get(1).map(|raw| parse_kind(raw)).transpose()?;
            list(context, kind)
        }
        "add" => {
            if args.len() < 3 {
                return Err(usage());
            }
            let kind = parse_kind(args[1])?;
            let name = context.manager.add_category(kind, &args[2..].join(" "))?;
            io::print_success(format!("Added {kind} category `{name}`."));
            Ok(())
        }
        "rename" => {
            if args.len() != 4 {
                return Err(usage());
            }
            let kind = parse_kind(args[1])?;
            let name = context.manager.rename_category(kind, args[2], args[3])?;
            io::print_success(format!("Renamed `{}` to `{name}`.", args[2]));
            io::print_hint("Existing transactions keep the old name.");
            Ok(())
        }
        "remove" => {
            if args.len() < 3 {
                return Err(usage());
            }
            let kind = parse_kind(args[1])?;
            let name = args[2..].join(" ");
            let orphans = context.manager.remove_category(kind, &name)?;
            io::print_success(format!("Removed {kind} category `{name}`."));
            if orphans > 0 {
                io::print_warning(format!(
                    "{orphans} transaction(s) still reference `{name}` and keep that label."
                ));
            }
            Ok(())
        }
        "reset" => {
            if context.is_interactive()
                && !io::confirm_action(&context.theme, "Restore the default categories?", false)?
            {
                io::print_info("Operation cancelled.");
                return Ok(());
            }
            context.manager.reset_categories()?;
            io::print_success("Categories restored to defaults.");
            Ok(())
        }
        _ => Err(usage()),
    }
}

fn list(context: &ShellContext, kind: Option<TransactionType>) -> CommandResult {
    let categories = CategoryService::list(context.manager.ledger(), kind);
    for wanted in [TransactionType::Income, TransactionType::Expense] {
        if kind.is_some_and(|kind| kind != wanted) {
            continue;
        }
        output_section(format!("{wanted} categories"));
        let names: Vec<&str> = categories
            .iter()
            .filter(|category| category.kind == wanted)
            .map(|category| category.name.as_str())
            .collect();
        if names.is_empty() {
            io::print_info("  (none)");
        }
        for name in names {
            let used = context.manager.ledger().references_to(name);
            io::print_info(format!("  {name:<20} {used} transaction(s)"));
        }
    }
    Ok(())
}
