use crate::cli::commands::transaction::{parse_kind, transaction_table};
use crate::cli::core::{CommandError, CommandResult, ParsedArgs, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::core::services::SummaryService;
use crate::core::time::{parse_date, MonthKey};
use crate::domain::{CategoryFilter, HistoryFilter, MonthlySummary, TypeFilter};

const HISTORY_USAGE: &str =
    "history [--from YYYY-MM-DD] [--to YYYY-MM-DD] [--type all|income|expense] [--category NAME|all]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "month",
            "Show income, expense and balance for a month",
            "month [YYYY-MM]",
            cmd_month,
        ),
        CommandEntry::new(
            "history",
            "Filter transactions by date range, type and category",
            HISTORY_USAGE,
            cmd_history,
        ),
        CommandEntry::new(
            "stats",
            "Category breakdown for one type in a month",
            "stats <income|expense> [YYYY-MM]",
            cmd_stats,
        ),
        CommandEntry::new(
            "info",
            "Show what is stored and where",
            "info",
            cmd_info,
        ),
    ]
}

fn month_arg(context: &ShellContext, raw: Option<&&str>) -> Result<MonthKey, CommandError> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|err: crate::errors::LedgerError| CommandError::InvalidArguments(err.to_string())),
        None => Ok(MonthKey::of(&context.manager.clock().now())),
    }
}

fn cmd_month(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = month_arg(context, args.first())?;
    let summary = SummaryService::monthly(context.manager.transactions(), month);
    output_section(format!("Summary {month}"));
    print_totals(context, &summary);
    Ok(())
}

fn print_totals(context: &ShellContext, summary: &MonthlySummary) {
    let amounts = context.amounts();
    io::print_info(format!("  Income : {}", amounts.amount(summary.income)));
    io::print_info(format!("  Expense: {}", amounts.amount(summary.expense)));
    io::print_info(format!("  Balance: {}", amounts.amount(summary.balance)));
    if context.manager.settings().mode.is_professional()
        || summary.income_tax > 0.0
        || summary.expense_tax > 0.0
    {
        io::print_info(format!(
            "  Tax collected: {}",
            amounts.amount(summary.income_tax)
        ));
        io::print_info(format!(
            "  Tax paid     : {}",
            amounts.amount(summary.expense_tax)
        ));
    }
    io::print_info(format!("  Transactions: {}", summary.transaction_count));
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["from", "to", "type", "category"], &[])?;
    if !parsed.positional.is_empty() {
        return Err(CommandError::InvalidArguments(format!("usage: {HISTORY_USAGE}")));
    }

    let mut filter = HistoryFilter::for_year_of(&context.manager.clock().now());
    if let Some(from) = parsed.value("from") {
        filter.start = parse_date(from).map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    }
    if let Some(to) = parsed.value("to") {
        filter.end = parse_date(to).map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    }
    if let Some(kind) = parsed.value("type") {
        filter.kind = TypeFilter::parse(kind).ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "`--type` expects all, income or expense, got `{kind}`"
            ))
        })?;
    }
    if let Some(category) = parsed.value("category") {
        filter.category = CategoryFilter::parse(category);
    }

    let report = SummaryService::history(context.manager.transactions(), &filter)?;
    output_section(format!("History {} to {}", filter.start, filter.end));
    if report.transactions.is_empty() {
        io::print_info("No transactions match.");
        return Ok(());
    }
    io::print_info(transaction_table(context, &report.transactions).render());

    let amounts = context.amounts();
    output_section("By month");
    let mut trend = Table::new(vec![
        TableColumn::left("Month"),
        TableColumn::right("Income"),
        TableColumn::right("Expense"),
    ]);
    for row in &report.monthly {
        trend.push(vec![
            row.month.clone(),
            amounts.amount(row.income),
            amounts.amount(row.expense),
        ]);
    }
    io::print_info(trend.render());

    output_section("By category");
    let mut distribution = Table::new(vec![
        TableColumn::left("Category"),
        TableColumn::left("Type"),
        TableColumn::right("Total"),
    ]);
    for row in &report.by_category {
        distribution.push(vec![
            row.name.clone(),
            row.kind.to_string(),
            amounts.amount(row.value),
        ]);
    }
    io::print_info(distribution.render());

    output_section("Totals");
    print_totals(context, &report.totals);
    Ok(())
}

fn cmd_stats(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = args
        .first()
        .ok_or_else(|| {
            CommandError::InvalidArguments("usage: stats <income|expense> [YYYY-MM]".into())
        })
        .and_then(|raw| parse_kind(raw))?;
    let month = month_arg(context, args.get(1))?;
    let shares = SummaryService::category_breakdown(context.manager.transactions(), kind, month);
    output_section(format!("{} by category, {month}", capitalize(kind.as_str())));
    if shares.is_empty() {
        io::print_info(format!("No {kind} recorded in {month}."));
        return Ok(());
    }
    let amounts = context.amounts();
    let mut table = Table::new(vec![
        TableColumn::left("Category"),
        TableColumn::right("Amount"),
        TableColumn::right("Share"),
    ]);
    for share in &shares {
        table.push(vec![
            share.name.clone(),
            amounts.amount(share.amount),
            amounts.percent(share.percentage),
        ]);
    }
    io::print_info(table.render());
    Ok(())
}

fn cmd_info(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let info = context.manager.storage_info();
    output_section("Storage");
    io::print_info(format!("  Store       : {}", context.manager.storage().describe()));
    io::print_info(format!("  Config file : {}", context.config_manager.path().display()));
    io::print_info(format!("  Transactions: {}", info.transaction_count));
    io::print_info(format!("  Categories  : {}", info.category_count));
    let describe = |date: Option<chrono::DateTime<chrono::Utc>>| {
        date.map(|value| value.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".into())
    };
    io::print_info(format!("  Oldest      : {}", describe(info.oldest)));
    io::print_info(format!("  Newest      : {}", describe(info.newest)));
    Ok(())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
