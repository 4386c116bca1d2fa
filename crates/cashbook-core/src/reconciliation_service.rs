//! Merges an edited period view back into the ledger by entry identifier.

use std::collections::HashSet;

use cashbook_domain::{Entry, EntryId, Ledger};
use serde::Serialize;
use tracing::info;

use crate::{recurrence_service::RecurrenceService, CoreError, EditedRow};

/// What a reconciliation did, by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub unchanged: Vec<EntryId>,
    pub modified: Vec<EntryId>,
    pub added: Vec<EntryId>,
    pub removed: Vec<EntryId>,
}

impl ReconciliationReport {
    pub fn is_noop(&self) -> bool {
        self.modified.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}

/// Fully validated change set, computed before the ledger is touched.
struct MergePlan {
    unchanged: Vec<EntryId>,
    replacements: Vec<(EntryId, Entry)>,
    additions: Vec<Entry>,
    removals: Vec<EntryId>,
}

pub struct ReconciliationService;

impl ReconciliationService {
    /// Applies `edited_rows` as the new content of the view that exposed
    /// `original_view_ids`.
    ///
    /// Rows with an id overwrite that entry (or leave it alone when nothing
    /// changed), rows without an id are inserted, and original ids missing from
    /// `edited_rows` are removed. Entries outside the view are never touched.
    /// Either every change is applied or none is. Row numbers in errors are
    /// 1-based positions in `edited_rows`.
    pub fn reconcile(
        ledger: &mut Ledger,
        original_view_ids: &[EntryId],
        edited_rows: &[EditedRow],
    ) -> Result<ReconciliationReport, CoreError> {
        let plan = Self::plan(ledger, original_view_ids, edited_rows)?;

        let mut staged = ledger.clone();
        let mut report = ReconciliationReport {
            unchanged: plan.unchanged,
            ..ReconciliationReport::default()
        };
        for (id, entry) in plan.replacements {
            staged.replace(id, entry).ok_or(CoreError::EntryNotFound(id))?;
            report.modified.push(id);
        }
        for id in plan.removals {
            staged.remove(id).ok_or(CoreError::EntryNotFound(id))?;
            report.removed.push(id);
        }
        report.added = staged.insert(plan.additions);
        *ledger = staged;

        info!(
            unchanged = report.unchanged.len(),
            modified = report.modified.len(),
            added = report.added.len(),
            removed = report.removed.len(),
            "reconciled edited view"
        );
        Ok(report)
    }

    fn plan(
        ledger: &Ledger,
        original_view_ids: &[EntryId],
        edited_rows: &[EditedRow],
    ) -> Result<MergePlan, CoreError> {
        let mut original: Vec<EntryId> = Vec::new();
        let mut original_set = HashSet::new();
        for &id in original_view_ids {
            if !ledger.contains(id) {
                return Err(CoreError::EntryNotFound(id));
            }
            if original_set.insert(id) {
                original.push(id);
            }
        }

        let mut seen = HashSet::new();
        let mut plan = MergePlan {
            unchanged: Vec::new(),
            replacements: Vec::new(),
            additions: Vec::new(),
            removals: Vec::new(),
        };

        for (index, row) in edited_rows.iter().enumerate() {
            let position = index + 1;
            let (entry, installments) = row
                .draft
                .check()
                .map_err(|reason| CoreError::validation(position, reason))?;

            match row.id {
                Some(id) => {
                    if !original_set.contains(&id) {
                        return Err(CoreError::validation(
                            position,
                            format!("entry {id} is not part of the edited view"),
                        ));
                    }
                    if !seen.insert(id) {
                        return Err(CoreError::validation(
                            position,
                            format!("entry {id} appears more than once"),
                        ));
                    }
                    let unchanged = ledger
                        .get(id)
                        .map(|current| current.entry == entry)
                        .unwrap_or(false);
                    if unchanged {
                        plan.unchanged.push(id);
                    } else {
                        plan.replacements.push((id, entry));
                    }
                }
                None => {
                    let expanded = RecurrenceService::expand(&entry, entry.date, installments)
                        .map_err(|err| CoreError::validation(position, err.to_string()))?;
                    plan.additions.extend(expanded);
                }
            }
        }

        plan.removals = original
            .into_iter()
            .filter(|id| !seen.contains(id))
            .collect();
        Ok(plan)
    }
}
