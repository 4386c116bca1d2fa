//! Installment expansion: one template entry becomes one entry per month.

use cashbook_domain::{add_months, Entry};
use chrono::NaiveDate;
use tracing::debug;

use crate::{draft::check_amount, CoreError, EntryDraft};

/// Longest series accepted in one submission (fifty years of monthly entries).
pub const MAX_INSTALLMENTS: u32 = 600;

/// Expands recurring templates into dated entries. Pure: never touches a ledger.
pub struct RecurrenceService;

impl RecurrenceService {
    /// Produces `installments` copies of `template`, dated on consecutive
    /// calendar months starting at `start_date`.
    ///
    /// Each date is computed from `start_date` directly, so a series that
    /// starts on the 31st clamps to shorter month ends without losing the
    /// 31st in later long months.
    pub fn expand(
        template: &Entry,
        start_date: NaiveDate,
        installments: u32,
    ) -> Result<Vec<Entry>, CoreError> {
        if installments < 1 {
            return Err(CoreError::InvalidInput(
                "installments must be at least 1".into(),
            ));
        }
        if installments > MAX_INSTALLMENTS {
            return Err(CoreError::InvalidInput(format!(
                "installments must not exceed {MAX_INSTALLMENTS} (got {installments})"
            )));
        }
        check_amount(template.amount).map_err(CoreError::InvalidInput)?;

        let mut entries = Vec::with_capacity(installments as usize);
        for step in 0..installments {
            let date = add_months(start_date, step as i32).ok_or_else(|| {
                CoreError::InvalidInput(format!(
                    "installment {} falls outside the supported calendar",
                    step + 1
                ))
            })?;
            entries.push(Entry {
                date,
                ..template.clone()
            });
        }
        debug!(
            installments,
            first = %start_date,
            last = %entries.last().map(|entry| entry.date).unwrap_or(start_date),
            "expanded recurring entry"
        );
        Ok(entries)
    }

    /// Validates a submitted row and expands it from its own date.
    pub fn expand_draft(draft: &EntryDraft) -> Result<Vec<Entry>, CoreError> {
        let (template, installments) = draft.validate()?;
        Self::expand(&template, template.date, installments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashbook_domain::{EntryKind, EntryStatus};
    use chrono::Datelike;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(amount: Decimal) -> Entry {
        Entry::new(date(2026, 1, 7), "Loan", EntryKind::Expense, amount)
    }

    #[test]
    fn expands_three_monthly_installments() {
        let entries = RecurrenceService::expand(&template(dec!(40000)), date(2026, 1, 7), 3)
            .expect("valid expansion");
        let dates: Vec<_> = entries.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![date(2026, 1, 7), date(2026, 2, 7), date(2026, 3, 7)]
        );
        for entry in &entries {
            assert_eq!(entry.amount, dec!(40000));
            assert_eq!(entry.kind, EntryKind::Expense);
            assert_eq!(entry.description, "Loan");
            assert_eq!(entry.status, EntryStatus::Pending);
        }
    }

    #[test]
    fn clamps_day_of_month_in_short_months() {
        let start = date(2026, 1, 31);
        let entries = RecurrenceService::expand(&template(dec!(10)), start, 2).unwrap();
        assert_eq!(entries[0].date, date(2026, 1, 31));
        assert_eq!(entries[1].date, date(2026, 2, 28));
    }

    #[test]
    fn clamp_does_not_stick_to_later_months() {
        let start = date(2024, 1, 31);
        let entries = RecurrenceService::expand(&template(dec!(10)), start, 4).unwrap();
        let dates: Vec<_> = entries.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 31),
                date(2024, 2, 29),
                date(2024, 3, 31),
                date(2024, 4, 30)
            ]
        );
    }

    #[test]
    fn start_date_overrides_template_date() {
        let entries = RecurrenceService::expand(&template(dec!(10)), date(2025, 11, 5), 3).unwrap();
        assert_eq!(entries[2].date, date(2026, 1, 5));
    }

    #[test]
    fn rejects_zero_installments_and_negative_amounts() {
        let zero = RecurrenceService::expand(&template(dec!(10)), date(2026, 1, 1), 0);
        assert!(matches!(zero, Err(CoreError::InvalidInput(_))));
        let negative = RecurrenceService::expand(&template(dec!(-1)), date(2026, 1, 1), 2);
        assert!(matches!(negative, Err(CoreError::InvalidInput(_))));
        let huge = RecurrenceService::expand(&template(dec!(1)), date(2026, 1, 1), 601);
        assert!(matches!(huge, Err(CoreError::InvalidInput(_))));
        let oversized = RecurrenceService::expand(&template(Decimal::MAX), date(2026, 1, 1), 2);
        assert!(matches!(oversized, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn expand_draft_uses_draft_date_and_count() {
        let draft = EntryDraft::new("2026-12-15", "Gym", "expense", "30").with_installments(2);
        let entries = RecurrenceService::expand_draft(&draft).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].date, date(2027, 1, 15));
    }

    proptest! {
        #[test]
        fn consecutive_installments_advance_one_month(
            year in 1990i32..2100,
            month in 1u32..=12,
            day in 1u32..=31,
            count in 1u32..=48,
        ) {
            let max_day = cashbook_domain::days_in_month(year, month).unwrap();
            let start = date(year, month, day.min(max_day));
            let entries = RecurrenceService::expand(&template(dec!(1)), start, count).unwrap();
            prop_assert_eq!(entries.len(), count as usize);
            for pair in entries.windows(2) {
                let (prev, next) = (pair[0].date, pair[1].date);
                let expected_month = prev.month() % 12 + 1;
                prop_assert_eq!(next.month(), expected_month);
                let expected_year = if prev.month() == 12 { prev.year() + 1 } else { prev.year() };
                prop_assert_eq!(next.year(), expected_year);
                prop_assert!(next.day() <= start.day());
            }
        }
    }
}
