//! Helper functions for high-level ledger orchestration.

use cashbook_domain::{Entry, EntryId, EntryStatus, Ledger, LedgerEntry};
use tracing::info;

use crate::{draft::check_amount, recurrence_service::RecurrenceService, CoreError, EntryDraft};

/// Provides constructor and mutation helpers for [`Ledger`] instances.
pub struct LedgerService;

impl LedgerService {
    /// Creates a new, empty ledger.
    pub fn create(name: impl Into<String>) -> Ledger {
        Ledger::new(name)
    }

    /// Appends entries and returns their freshly assigned identifiers.
    ///
    /// The batch is checked as a whole first; one bad amount inserts nothing.
    pub fn insert(ledger: &mut Ledger, entries: Vec<Entry>) -> Result<Vec<EntryId>, CoreError> {
        for entry in &entries {
            check_amount(entry.amount).map_err(CoreError::InvalidInput)?;
        }
        let ids = ledger.insert(entries);
        info!(count = ids.len(), ledger = %ledger.name, "inserted entries");
        Ok(ids)
    }

    /// Validates a submitted row, expands its installments and inserts the result.
    pub fn submit(ledger: &mut Ledger, draft: &EntryDraft) -> Result<Vec<EntryId>, CoreError> {
        let entries = RecurrenceService::expand_draft(draft)?;
        Self::insert(ledger, entries)
    }

    pub fn all(ledger: &Ledger) -> &[LedgerEntry] {
        ledger.all()
    }

    pub fn get(ledger: &Ledger, id: EntryId) -> Result<&LedgerEntry, CoreError> {
        ledger.get(id).ok_or(CoreError::EntryNotFound(id))
    }

    /// Overwrites every field of the entry stored under `id`.
    pub fn replace(ledger: &mut Ledger, id: EntryId, entry: Entry) -> Result<(), CoreError> {
        check_amount(entry.amount).map_err(CoreError::InvalidInput)?;
        ledger
            .replace(id, entry)
            .ok_or(CoreError::EntryNotFound(id))?;
        Ok(())
    }

    /// Marks an entry settled by replacing the whole row with a settled copy.
    pub fn settle(ledger: &mut Ledger, id: EntryId) -> Result<bool, CoreError> {
        let current = Self::get(ledger, id)?.entry.clone();
        if current.is_settled() {
            return Ok(false);
        }
        Self::replace(ledger, id, current.with_status(EntryStatus::Settled))?;
        info!(%id, "entry settled");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashbook_domain::EntryKind;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample() -> Entry {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        Entry::new(date, "Electricity", EntryKind::Expense, dec!(3611))
    }

    #[test]
    fn replace_fails_for_missing_entry() {
        let mut ledger = LedgerService::create("Replace");
        let err = LedgerService::replace(&mut ledger, EntryId(1), sample())
            .expect_err("replace must fail for unknown id");
        assert!(matches!(err, CoreError::EntryNotFound(EntryId(1))), "{err:?}");
        assert!(ledger.is_empty());
    }

    #[test]
    fn replace_rejects_negative_amount() {
        let mut ledger = LedgerService::create("Replace");
        let ids = LedgerService::insert(&mut ledger, vec![sample()]).unwrap();
        let mut bad = sample();
        bad.amount = dec!(-1);
        let err = LedgerService::replace(&mut ledger, ids[0], bad).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert_eq!(ledger.get(ids[0]).unwrap().entry, sample());
    }

    #[test]
    fn insert_rejects_the_whole_batch_on_a_bad_amount() {
        let mut ledger = LedgerService::create("Insert");
        let mut negative = sample();
        negative.amount = dec!(-1);
        let err = LedgerService::insert(&mut ledger, vec![sample(), negative]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)), "{err:?}");
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_id(), EntryId(1));

        let mut huge = sample();
        huge.amount = Decimal::MAX;
        assert!(LedgerService::insert(&mut ledger, vec![huge]).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn settle_replaces_row_and_keeps_id() {
        let mut ledger = LedgerService::create("Settle");
        let ids = LedgerService::insert(&mut ledger, vec![sample()]).unwrap();
        assert!(LedgerService::settle(&mut ledger, ids[0]).unwrap());
        assert!(!LedgerService::settle(&mut ledger, ids[0]).unwrap());
        let stored = LedgerService::get(&ledger, ids[0]).unwrap();
        assert_eq!(stored.entry.status, EntryStatus::Settled);
        assert_eq!(stored.entry.amount, dec!(3611));
    }

    #[test]
    fn submit_expands_installments() {
        let mut ledger = LedgerService::create("Submit");
        let draft =
            EntryDraft::new("2026-01-07", "Loan", "expense", "40000").with_installments(3);
        let ids = LedgerService::submit(&mut ledger, &draft).unwrap();
        assert_eq!(ids, vec![EntryId(1), EntryId(2), EntryId(3)]);
        assert_eq!(LedgerService::all(&ledger).len(), 3);
    }

    #[test]
    fn submit_leaves_ledger_untouched_on_invalid_input() {
        let mut ledger = LedgerService::create("Submit");
        let draft = EntryDraft::new("2026-01-07", "Loan", "expense", "-5");
        assert!(LedgerService::submit(&mut ledger, &draft).is_err());
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_id(), EntryId(1));
    }
}
