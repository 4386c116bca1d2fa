//! Cashbook tracks planned and realized household income and expenses across
//! months and years. This crate wires the ledger services to a JSON store, a
//! CSV exporter, offline edit sheets and the `cashbook_cli` shell.

pub mod cli;
pub mod export;
pub mod sheet;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("cashbook tracing initialized");
    });
}
