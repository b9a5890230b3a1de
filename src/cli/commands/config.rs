use std::path::PathBuf;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "config [show|set <locale|currency|color|recent_limit|data_dir> <value>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change display preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        let config = &context.config;
        output_section("Configuration");
        io::print_info(format!("  Locale      : {}", config.locale));
        io::print_info(format!("  Currency    : {}", config.currency));
        io::print_info(format!(
            "  Color       : {}",
            if config.ui_color_enabled { "on" } else { "off" }
        ));
        io::print_info(format!("  Recent limit: {}", config.recent_limit));
        io::print_info(format!(
            "  Data dir    : {}",
            context.config_manager.data_dir(config).display()
        ));
        return Ok(());
    }

    if !args[0].eq_ignore_ascii_case("set") || args.len() < 3 {
        return Err(CommandError::InvalidArguments(format!("usage: {USAGE}")));
    }
    let value = args[2..].join(" ");
    let value = value.trim();
    match args[1].to_lowercase().as_str() {
        "locale" => context.config.locale = value.to_string(),
        "currency" => context.config.currency = value.to_uppercase(),
        "color" => {
            context.config.ui_color_enabled = match value.to_lowercase().as_str() {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                other => {
                    return Err(CommandError::InvalidArguments(format!(
                        "color expects on or off, got `{other}`"
                    )))
                }
            }
        }
        "recent_limit" => {
            context.config.recent_limit = value.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("recent_limit must be a number, got `{value}`"))
            })?
        }
        "data_dir" => {
            context.config.data_dir = match value {
                "" | "default" => None,
                path => Some(PathBuf::from(path)),
            };
            context.persist_config()?;
            io::print_success("Configuration updated.");
            io::print_hint("The new data directory is used from the next start.");
            return Ok(());
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown config key `{other}`"
            )))
        }
    }
    context.persist_config()?;
    io::print_success("Configuration updated.");
    Ok(())
}
