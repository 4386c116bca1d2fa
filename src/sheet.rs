//! Edit sheets: one month view written to a JSON file, edited offline and
//! applied back through reconciliation.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::Path,
};

use cashbook_core::{
    CoreError, EditedRow, LedgerSession, LedgerStorage, PeriodFilter, ReconciliationReport,
};
use cashbook_domain::{EntryId, Ledger, Month};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed edit sheet: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A month view plus the identifiers it exposed when it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSheet {
    pub year: i32,
    pub month: Month,
    pub original_ids: Vec<EntryId>,
    pub rows: Vec<EditedRow>,
}

impl EditSheet {
    pub fn for_month(ledger: &Ledger, year: i32, month: Month) -> Self {
        let view = PeriodFilter::by_month(ledger, year, month);
        Self {
            year,
            month,
            original_ids: PeriodFilter::ids(&view),
            rows: view.into_iter().map(EditedRow::from).collect(),
        }
    }

    /// Writes through a sibling `.tmp` file so a failed write never leaves a
    /// half-written sheet behind.
    pub fn write(&self, path: &Path) -> Result<(), SheetError> {
        let data = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, SheetError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Reconciles the sheet's rows into the session's ledger and persists.
    pub fn apply<S: LedgerStorage>(
        &self,
        session: &mut LedgerSession<S>,
    ) -> Result<ReconciliationReport, CoreError> {
        session.reconcile(&self.original_ids, &self.rows)
    }
}
