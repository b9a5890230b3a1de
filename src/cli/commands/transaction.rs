use crate::cli::core::{short_id, CommandError, CommandResult, ParsedArgs, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::core::services::{EntryInput, TransactionService};
use crate::core::tax::EditedField;
use crate::core::time::MonthKey;
use crate::domain::{Transaction, TransactionType};

const ADD_USAGE: &str = "add <income|expense> <amount> <category> <description> [--month YYYY-MM] [--from base|tax|total] [--rate PERCENT]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("add", "Record an income or expense", ADD_USAGE, cmd_add),
        CommandEntry::new(
            "list",
            "Show the most recent transactions",
            "list [limit]",
            cmd_list,
        ),
        CommandEntry::new(
            "remove",
            "Delete a transaction by id or id prefix",
            "remove <id>",
            cmd_remove,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() && context.is_interactive() {
        return add_wizard(context);
    }

    let parsed = ParsedArgs::parse(args, &["month", "from", "rate"], &[])?;
    if parsed.positional.len() < 4 {
        return Err(CommandError::InvalidArguments(format!("usage: {ADD_USAGE}")));
    }
    let kind = parse_kind(parsed.positional[0])?;
    let amount = context.parse_amount(parsed.positional[1])?;
    let category = parsed.positional[2];
    let description = parsed.positional[3..].join(" ");

    let mut input = EntryInput::new(kind, amount, category, description);
    if let Some(field) = parsed.value("from") {
        let field = EditedField::parse(field).ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "`--from` expects base, tax or total, got `{field}`"
            ))
        })?;
        input = input.entered_as(field);
    }
    if let Some(rate) = parsed.value("rate") {
        input = input.with_rate(context.parse_amount(rate)?);
    }
    let month = parse_month(parsed.value("month").unwrap_or(""))?;

    if !context.manager.settings().mode.is_professional()
        && (parsed.has("from") || parsed.has("rate"))
    {
        io::print_warning("Basic mode ignores `--from` and `--rate`; use `settings mode professional`.");
    }

    let added = context.manager.add_transaction(&input, month)?;
    report_added(context, &added);
    Ok(())
}

fn add_wizard(context: &mut ShellContext) -> CommandResult {
    let kinds = vec!["expense".to_string(), "income".to_string()];
    let kind = match io::prompt_select(&context.theme, "Type", &kinds)? {
        0 => TransactionType::Expense,
        _ => TransactionType::Income,
    };

    let professional = context.manager.settings().mode.is_professional();
    let (amount, entered, rate) = if professional {
        let fields = vec!["base".to_string(), "tax".to_string(), "total".to_string()];
        let choice = io::prompt_select(&context.theme, "Which amount will you enter?", &fields)?;
        let field = EditedField::parse(&fields[choice]).unwrap_or_default();
        let amount = context.parse_amount(&io::prompt_text(&context.theme, "Amount")?)?;
        let default_rate = context.manager.settings().tax_percentage;
        let raw_rate = io::prompt_optional_text(
            &context.theme,
            &format!("Tax rate % (blank for {default_rate})"),
        )?;
        let rate = if raw_rate.trim().is_empty() {
            None
        } else {
            Some(context.parse_amount(&raw_rate)?)
        };
        (amount, field, rate)
    } else {
        let amount = context.parse_amount(&io::prompt_text(&context.theme, "Amount")?)?;
        (amount, EditedField::Base, None)
    };

    let names: Vec<String> = context.manager.categories().names(kind).to_vec();
    if names.is_empty() {
        return Err(CommandError::InvalidArguments(format!(
            "no {kind} categories; add one with `category add {kind} <name>`"
        )));
    }
    let category = names[io::prompt_select(&context.theme, "Category", &names)?].clone();
    let description = io::prompt_text(&context.theme, "Description")?;
    let month = parse_month(&io::prompt_optional_text(
        &context.theme,
        "Month YYYY-MM (blank for current)",
    )?)?;

    let mut input = EntryInput::new(kind, amount, category, description).entered_as(entered);
    if let Some(rate) = rate {
        input = input.with_rate(rate);
    }
    let added = context.manager.add_transaction(&input, month)?;
    report_added(context, &added);
    Ok(())
}

/// Blank means the current month.
fn parse_month(raw: &str) -> Result<Option<MonthKey>, CommandError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<MonthKey>()
        .map(Some)
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

fn report_added(context: &ShellContext, txn: &Transaction) {
    let amounts = context.amounts();
    io::print_success(format!(
        "Recorded {} {} in {} ({}) [{}]",
        txn.kind,
        amounts.amount(txn.amount),
        txn.category,
        txn.date.format("%Y-%m-%d"),
        short_id(&txn.id)
    ));
    if txn.tax_amount > 0.0 {
        io::print_info(format!(
            "  base {} + tax {} at {}%",
            amounts.amount(txn.base_amount),
            amounts.amount(txn.tax_amount),
            txn.tax_percentage
        ));
    }
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let limit = match args.first() {
        Some(raw) if raw.eq_ignore_ascii_case("all") => None,
        Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
            CommandError::InvalidArguments(format!("invalid limit `{raw}`"))
        })?),
        None => Some(context.config.recent_limit),
    };
    let transactions = TransactionService::list(context.manager.ledger(), limit);
    if transactions.is_empty() {
        io::print_info("No transactions recorded.");
        return Ok(());
    }
    output_section(format!(
        "Transactions ({} of {})",
        transactions.len(),
        context.manager.transactions().len()
    ));
    io::print_info(transaction_table(context, &transactions).render());
    Ok(())
}

pub(crate) fn transaction_table(context: &ShellContext, transactions: &[&Transaction]) -> Table {
    let amounts = context.amounts();
    let mut table = Table::new(vec![
        TableColumn::left("ID"),
        TableColumn::left("Date"),
        TableColumn::left("Type"),
        TableColumn::left("Category").max(18),
        TableColumn::right("Amount"),
        TableColumn::right("Tax"),
        TableColumn::left("Description").max(32),
    ]);
    for txn in transactions {
        table.push(vec![
            short_id(&txn.id),
            txn.date.format("%Y-%m-%d").to_string(),
            txn.kind.to_string(),
            txn.category.clone(),
            amounts.amount(txn.amount),
            amounts.amount(txn.tax_amount),
            txn.description.clone(),
        ]);
    }
    table
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let needle = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: remove <id>".into()))?;
    let target = context.resolve_transaction(needle)?;
    if context.is_interactive() {
        let prompt = format!(
            "Delete {} {} ({})?",
            target.kind,
            context.amounts().amount(target.amount),
            target.description
        );
        if !io::confirm_action(&context.theme, &prompt, false)? {
            io::print_info("Operation cancelled.");
            return Ok(());
        }
    }
    let removed = context.manager.remove_transaction(&target.id)?;
    io::print_success(format!("Removed transaction {}.", short_id(&removed.id)));
    Ok(())
}

pub(crate) fn parse_kind(raw: &str) -> Result<TransactionType, CommandError> {
    TransactionType::parse(raw).ok_or_else(|| {
        CommandError::InvalidArguments(format!("expected `income` or `expense`, got `{raw}`"))
    })
}
