#![doc(test(attr(deny(warnings))))]

//! Tally Core records income and expenses, keeps tax splits consistent,
//! aggregates them by month and category, and persists everything through a
//! pluggable key-value store with JSON backup support.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("tally tracing initialized");
    });
}
