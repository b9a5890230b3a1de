use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::core::tax::TAX_RATE_PRESETS;
use crate::domain::EntryMode;

const USAGE: &str = "settings [show|mode <basic|professional>|tax <percent>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "settings",
        "Show or change entry mode and default tax rate",
        USAGE,
        cmd_settings,
    )]
}

fn cmd_settings(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|value| value.to_lowercase());
    match action.as_deref() {
        None | Some("show") => {
            let settings = context.manager.settings();
            output_section("Settings");
            io::print_info(format!("  Mode          : {}", settings.mode));
            io::print_info(format!("  Default tax % : {}", settings.tax_percentage));
            Ok(())
        }
        Some("mode") => {
            let raw = args.get(1).ok_or_else(usage)?;
            let mode = EntryMode::parse(raw).ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "mode must be `basic` or `professional`, got `{raw}`"
                ))
            })?;
            context.manager.set_mode(mode)?;
            io::print_success(format!("Entry mode set to {mode}."));
            Ok(())
        }
        Some("tax") => {
            let raw = args.get(1).ok_or_else(usage)?;
            let rate = context.parse_amount(raw.trim_end_matches('%'))?;
            context.manager.set_tax_percentage(rate)?;
            io::print_success(format!("Default tax rate set to {rate}%."));
            if !TAX_RATE_PRESETS.contains(&rate) {
                io::print_hint(format!("Common rates: {}", presets_label()));
            }
            Ok(())
        }
        Some(_) => Err(usage()),
    }
}

fn usage() -> CommandError {
    CommandError::InvalidArguments(format!("usage: {USAGE}"))
}

pub(crate) fn presets_label() -> String {
    TAX_RATE_PRESETS
        .iter()
        .map(|rate| format!("{rate}%"))
        .collect::<Vec<_>>()
        .join(", ")
}
