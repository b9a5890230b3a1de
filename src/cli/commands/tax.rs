use crate::cli::commands::settings::presets_label;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::core::tax::{EditedField, TaxCalculator};

const USAGE: &str = "tax <base|tax|total> <amount> [rate]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "tax",
        "Split an amount into base, tax and total",
        USAGE,
        cmd_tax,
    )]
}

fn cmd_tax(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(CommandError::InvalidArguments(format!("usage: {USAGE}")));
    }
    let field = EditedField::parse(args[0]).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "expected base, tax or total, got `{}`",
            args[0]
        ))
    })?;
    let value = context.parse_amount(args[1])?;
    let rate = match args.get(2) {
        Some(raw) => context.parse_amount(raw.trim_end_matches('%'))?,
        None => context.manager.settings().tax_percentage,
    };

    let mut calculator = TaxCalculator::new(rate);
    let split = match field {
        EditedField::Base => calculator.set_base(value),
        EditedField::Tax => calculator.set_tax(value),
        EditedField::Total => calculator.set_total(value),
    }
    .map_err(|err| CommandError::InvalidArguments(err.to_string()))?
    .rounded();

    let amounts = context.amounts();
    output_section(format!("Tax split at {rate}%"));
    io::print_info(format!("  Base : {}", amounts.amount(split.base)));
    io::print_info(format!("  Tax  : {}", amounts.amount(split.tax)));
    io::print_info(format!("  Total: {}", amounts.amount(split.total)));
    if field == EditedField::Tax && rate == 0.0 {
        io::print_warning("A 0% rate cannot derive a base from tax; base set to 0.");
    }
    io::print_hint(format!("Presets: {}", presets_label()));
    Ok(())
}
