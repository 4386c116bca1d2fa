//! cashbook-core
//!
//! Business logic and services for the cash-flow ledger.
//! Depends on cashbook-domain. No CLI, no terminal I/O, no direct file access.

pub mod draft;
pub mod error;
pub mod ledger_service;
pub mod period_filter;
pub mod reconciliation_service;
pub mod recurrence_service;
pub mod session;
pub mod storage;
pub mod summary_service;
pub mod time;


pub use draft::*;
pub use error::CoreError;
pub use ledger_service::*;
pub use period_filter::*;
pub use reconciliation_service::*;
pub use recurrence_service::*;
pub use session::*;
pub use storage::{LedgerStorage, MemoryLedgerStorage};
pub use summary_service::*;
pub use time::{Clock, FixedClock};
