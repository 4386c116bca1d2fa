//! Read-only period views over a ledger.

use std::{collections::BTreeSet, fmt};

use cashbook_domain::{EntryId, Ledger, LedgerEntry, Month};
use tracing::debug;

/// A (year) or (year, month) scope requested by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodScope {
    Month { year: i32, month: Month },
    Year { year: i32 },
}

impl PeriodScope {
    pub fn month(year: i32, month: Month) -> Self {
        PeriodScope::Month { year, month }
    }

    pub fn year(year: i32) -> Self {
        PeriodScope::Year { year }
    }

    pub fn contains(&self, row: &LedgerEntry) -> bool {
        match *self {
            PeriodScope::Month { year, month } => {
                row.entry.year() == year && row.entry.month() == month
            }
            PeriodScope::Year { year } => row.entry.year() == year,
        }
    }
}

impl fmt::Display for PeriodScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodScope::Month { year, month } => write!(f, "{month} {year}"),
            PeriodScope::Year { year } => write!(f, "{year}"),
        }
    }
}

/// Selects ledger rows by period. Results borrow from the ledger and cannot
/// be used to mutate it.
pub struct PeriodFilter;

impl PeriodFilter {
    /// Rows dated in the given month, in identifier order.
    pub fn by_month(ledger: &Ledger, year: i32, month: Month) -> Vec<&LedgerEntry> {
        let rows: Vec<&LedgerEntry> = ledger
            .all()
            .iter()
            .filter(|row| PeriodScope::month(year, month).contains(row))
            .collect();
        debug!(year, %month, matched = rows.len(), "month view");
        rows
    }

    /// Rows dated in the given year, in chronological order.
    pub fn by_year(ledger: &Ledger, year: i32) -> Vec<&LedgerEntry> {
        let mut rows: Vec<&LedgerEntry> = ledger
            .all()
            .iter()
            .filter(|row| row.entry.year() == year)
            .collect();
        rows.sort_by_key(|row| (row.entry.date, row.id));
        debug!(year, matched = rows.len(), "year view");
        rows
    }

    pub fn select(ledger: &Ledger, scope: PeriodScope) -> Vec<&LedgerEntry> {
        match scope {
            PeriodScope::Month { year, month } => Self::by_month(ledger, year, month),
            PeriodScope::Year { year } => Self::by_year(ledger, year),
        }
    }

    /// Distinct years that have at least one entry, ascending.
    pub fn years(ledger: &Ledger) -> Vec<i32> {
        let years: BTreeSet<i32> = ledger.all().iter().map(|row| row.entry.year()).collect();
        years.into_iter().collect()
    }

    /// Distinct months of `year` that have at least one entry, ascending.
    pub fn months(ledger: &Ledger, year: i32) -> Vec<Month> {
        let months: BTreeSet<Month> = ledger
            .all()
            .iter()
            .filter(|row| row.entry.year() == year)
            .map(|row| row.entry.month())
            .collect();
        months.into_iter().collect()
    }

    /// Identifiers a view exposed; the input to reconciliation.
    pub fn ids(view: &[&LedgerEntry]) -> Vec<EntryId> {
        view.iter().map(|row| row.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashbook_domain::{Entry, EntryKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(y: i32, m: u32, d: u32) -> Entry {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Entry::new(date, format!("{y}-{m}-{d}"), EntryKind::Income, dec!(1))
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new("Filter");
        ledger.insert([
            entry(2026, 3, 20),
            entry(2026, 1, 15),
            entry(2025, 12, 31),
            entry(2026, 1, 2),
            entry(2026, 3, 1),
        ]);
        ledger
    }

    #[test]
    fn by_month_keeps_only_matching_rows() {
        let ledger = sample_ledger();
        let view = PeriodFilter::by_month(&ledger, 2026, Month::January);
        let ids = PeriodFilter::ids(&view);
        assert_eq!(ids, vec![EntryId(2), EntryId(4)]);
    }

    #[test]
    fn by_year_sorts_chronologically() {
        let ledger = sample_ledger();
        let dates: Vec<_> = PeriodFilter::by_year(&ledger, 2026)
            .into_iter()
            .map(|row| row.entry.date.to_string())
            .collect();
        assert_eq!(
            dates,
            vec!["2026-01-02", "2026-01-15", "2026-03-01", "2026-03-20"]
        );
    }

    #[test]
    fn empty_scopes_return_empty_views() {
        let ledger = sample_ledger();
        assert!(PeriodFilter::by_month(&ledger, 2026, Month::February).is_empty());
        assert!(PeriodFilter::by_year(&ledger, 1999).is_empty());
        assert!(PeriodFilter::by_year(&Ledger::new("Empty"), 2026).is_empty());
    }

    #[test]
    fn years_and_months_list_present_periods() {
        let ledger = sample_ledger();
        assert_eq!(PeriodFilter::years(&ledger), vec![2025, 2026]);
        assert_eq!(
            PeriodFilter::months(&ledger, 2026),
            vec![Month::January, Month::March]
        );
    }

    #[test]
    fn scope_display_is_human_readable() {
        assert_eq!(
            PeriodScope::month(2026, Month::January).to_string(),
            "January 2026"
        );
        assert_eq!(PeriodScope::year(2026).to_string(), "2026");
    }
}
