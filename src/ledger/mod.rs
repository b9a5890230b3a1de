//! In-memory application state shared by every front end.

#[allow(clippy::module_inception)]
pub mod ledger;

pub use ledger::Ledger;
