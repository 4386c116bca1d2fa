//! One named ledger paired with the store it persists to.

use cashbook_domain::{EntryId, Ledger};
use tracing::info;

use crate::{
    ledger_service::LedgerService, reconciliation_service::ReconciliationService,
    storage::LedgerStorage, CoreError, EditedRow, EntryDraft, ReconciliationReport,
};

/// Owns the in-memory ledger for one name. Every mutation runs on a copy that
/// is persisted first and only then becomes the session's ledger, so a failed
/// write leaves the session exactly as it was.
pub struct LedgerSession<S: LedgerStorage> {
    name: String,
    ledger: Ledger,
    storage: S,
}

impl<S: LedgerStorage> LedgerSession<S> {
    /// Loads `name` from `storage`, or starts an empty ledger when the store
    /// has none under that name. Nothing is written until the first mutation.
    pub fn open(storage: S, name: &str) -> Result<Self, CoreError> {
        let ledger = if storage.contains_ledger(name)? {
            let ledger = storage.load_ledger(name)?;
            info!(ledger = name, entries = ledger.len(), "ledger loaded");
            ledger
        } else {
            info!(ledger = name, "starting empty ledger");
            LedgerService::create(name)
        };
        Ok(Self {
            name: name.to_string(),
            ledger,
            storage,
        })
    }

    /// Starts a fresh ledger and persists it immediately.
    pub fn create(storage: S, name: &str) -> Result<Self, CoreError> {
        let ledger = LedgerService::create(name);
        storage.save_ledger(name, &ledger)?;
        info!(ledger = name, "ledger created");
        Ok(Self {
            name: name.to_string(),
            ledger,
            storage,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Writes the current ledger as-is.
    pub fn save(&self) -> Result<(), CoreError> {
        self.storage.save_ledger(&self.name, &self.ledger)?;
        info!(ledger = %self.name, entries = self.ledger.len(), "ledger saved");
        Ok(())
    }

    pub fn add(&mut self, draft: &EntryDraft) -> Result<Vec<EntryId>, CoreError> {
        self.commit(|ledger| LedgerService::submit(ledger, draft))
    }

    pub fn settle(&mut self, id: EntryId) -> Result<bool, CoreError> {
        self.commit(|ledger| LedgerService::settle(ledger, id))
    }

    /// Reconciles an edited view and persists the result as one unit.
    pub fn reconcile(
        &mut self,
        original_view_ids: &[EntryId],
        edited_rows: &[EditedRow],
    ) -> Result<ReconciliationReport, CoreError> {
        self.commit(|ledger| {
            ReconciliationService::reconcile(ledger, original_view_ids, edited_rows)
        })
    }

    fn commit<T>(
        &mut self,
        apply: impl FnOnce(&mut Ledger) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut staged = self.ledger.clone();
        let outcome = apply(&mut staged)?;
        self.storage.save_ledger(&self.name, &staged)?;
        self.ledger = staged;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::MemoryLedgerStorage;

    fn draft(amount: &str) -> EntryDraft {
        EntryDraft::new("2026-01-10", "Groceries", "expense", amount)
    }

    #[test]
    fn open_starts_empty_without_writing() {
        let store = Arc::new(MemoryLedgerStorage::new());
        let session = LedgerSession::open(Arc::clone(&store), "home").unwrap();
        assert!(session.ledger().is_empty());
        assert!(store.list_ledgers().unwrap().is_empty());
    }

    #[test]
    fn add_persists_and_reopens() {
        let store = Arc::new(MemoryLedgerStorage::new());
        let mut session = LedgerSession::open(Arc::clone(&store), "home").unwrap();
        let ids = session.add(&draft("42.50").with_installments(2)).unwrap();
        assert_eq!(ids.len(), 2);

        let reopened = LedgerSession::open(store, "home").unwrap();
        assert_eq!(reopened.ledger(), session.ledger());
    }

    #[test]
    fn failed_write_keeps_previous_ledger() {
        let store = Arc::new(MemoryLedgerStorage::new());
        let mut session = LedgerSession::create(Arc::clone(&store), "home").unwrap();
        session.add(&draft("10")).unwrap();
        let before = session.ledger().clone();

        store.fail_writes(true);
        let err = session.add(&draft("20")).unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        assert_eq!(session.ledger(), &before);
        assert!(session.settle(EntryId(1)).is_err());
        assert!(!session.ledger().get(EntryId(1)).unwrap().entry.is_settled());

        store.fail_writes(false);
        assert!(session.settle(EntryId(1)).unwrap());
        assert_eq!(store.load_ledger("home").unwrap(), *session.ledger());
    }
}
