//! cashbook-domain
//!
//! Pure domain models (Entry, Ledger, period totals, calendar helpers).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod calendar;
pub mod entry;
pub mod ledger;
pub mod summary;

pub use calendar::*;
pub use entry::*;
pub use ledger::*;
pub use summary::*;
