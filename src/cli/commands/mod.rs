pub mod backup;
pub mod category;
pub mod config;
pub mod settings;
pub mod summary;
pub mod system;
pub mod tax;
pub mod transaction;

use crate::cli::registry::{CommandEntry, CommandRegistry};

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(transaction::definitions());
    commands.extend(summary::definitions());
    commands.extend(category::definitions());
    commands.extend(settings::definitions());
    commands.extend(tax::definitions());
    commands.extend(backup::definitions());
    commands.extend(config::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in all_definitions() {
        registry.register(entry);
    }
}
