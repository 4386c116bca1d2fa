use std::io;

use cashbook_domain::EntryId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),
    #[error("Validation failed on row {row}: {reason}")]
    Validation { row: usize, reason: String },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl CoreError {
    pub(crate) fn validation(row: usize, reason: impl Into<String>) -> Self {
        CoreError::Validation {
            row,
            reason: reason.into(),
        }
    }
}
