pub mod ledger_manager;
pub mod services;
pub mod tax;
pub mod time;

pub use ledger_manager::{ImportReport, LedgerManager};
