//! Planned vs. realized aggregation over filtered views.

use cashbook_domain::{
    ConsistencyWarning, EntryKind, Ledger, LedgerEntry, Month, MonthlySummary, PeriodSummary,
    PeriodTotals, MAX_AMOUNT,
};
use rust_decimal::Decimal;
use tracing::warn;

use crate::period_filter::PeriodFilter;

pub struct SummaryService;

impl SummaryService {
    /// Aggregates a view into planned/realized totals.
    ///
    /// Negative pending figures are reported as warnings, never clamped.
    /// Rows beyond [`MAX_AMOUNT`] are reported and left out of the totals.
    pub fn summarize(rows: &[&LedgerEntry]) -> PeriodSummary {
        let mut totals = PeriodTotals::default();
        let mut warnings = Vec::new();

        for row in rows {
            let entry = &row.entry;
            if entry.amount.abs() > MAX_AMOUNT {
                warnings.push(ConsistencyWarning::AmountTooLarge {
                    id: row.id,
                    amount: entry.amount,
                });
                continue;
            }
            if entry.amount < Decimal::ZERO {
                warnings.push(ConsistencyWarning::NegativeAmount {
                    id: row.id,
                    amount: entry.amount,
                });
            }
            match entry.kind {
                EntryKind::Income => {
                    totals.planned_income += entry.amount;
                    if entry.is_settled() {
                        totals.realized_income += entry.amount;
                    }
                }
                EntryKind::Expense => {
                    totals.planned_expense += entry.amount;
                    if entry.is_settled() {
                        totals.realized_expense += entry.amount;
                    }
                }
            }
        }

        if totals.pending_income() < Decimal::ZERO {
            warnings.push(ConsistencyWarning::NegativePendingIncome {
                pending: totals.pending_income(),
            });
        }
        if totals.pending_expense() < Decimal::ZERO {
            warnings.push(ConsistencyWarning::NegativePendingExpense {
                pending: totals.pending_expense(),
            });
        }
        for warning in &warnings {
            warn!(%warning, "ledger consistency check failed");
        }

        PeriodSummary {
            totals,
            entry_count: rows.len(),
            warnings,
        }
    }

    pub fn summarize_month(ledger: &Ledger, year: i32, month: Month) -> PeriodSummary {
        Self::summarize(&PeriodFilter::by_month(ledger, year, month))
    }

    pub fn summarize_year(ledger: &Ledger, year: i32) -> PeriodSummary {
        Self::summarize(&PeriodFilter::by_year(ledger, year))
    }

    /// Month-over-month view: one summary per month of `year` that has entries.
    pub fn monthly_trend(ledger: &Ledger, year: i32) -> Vec<MonthlySummary> {
        let rows = PeriodFilter::by_year(ledger, year);
        let mut trend: Vec<MonthlySummary> = Vec::new();
        for month in Month::ALL {
            let subset: Vec<&LedgerEntry> = rows
                .iter()
                .copied()
                .filter(|row| row.entry.month() == month)
                .collect();
            if subset.is_empty() {
                continue;
            }
            trend.push(MonthlySummary {
                month,
                summary: Self::summarize(&subset),
            });
        }
        trend
    }

    /// Like [`SummaryService::monthly_trend`] but always twelve points,
    /// empty months carrying zero totals.
    pub fn monthly_trend_full(ledger: &Ledger, year: i32) -> Vec<MonthlySummary> {
        let mut present = Self::monthly_trend(ledger, year).into_iter().peekable();
        Month::ALL
            .iter()
            .map(|&month| match present.next_if(|point| point.month == month) {
                Some(point) => point,
                None => MonthlySummary {
                    month,
                    summary: PeriodSummary::default(),
                },
            })
            .collect()
    }

    /// Share of planned expense already settled, as a percentage.
    pub fn settlement_ratio(totals: &PeriodTotals) -> Option<Decimal> {
        if totals.planned_expense.is_zero() {
            return None;
        }
        Some((totals.realized_expense / totals.planned_expense * Decimal::ONE_HUNDRED).round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashbook_domain::{Entry, EntryId, EntryStatus};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(m: u32, kind: EntryKind, amount: Decimal, status: EntryStatus) -> Entry {
        let date = NaiveDate::from_ymd_opt(2026, m, 10).unwrap();
        Entry::new(date, "row", kind, amount).with_status(status)
    }

    fn january_ledger() -> Ledger {
        let mut ledger = Ledger::new("Summary");
        ledger.insert([
            entry(1, EntryKind::Income, dec!(115000), EntryStatus::Pending),
            entry(1, EntryKind::Expense, dec!(3611), EntryStatus::Settled),
        ]);
        ledger
    }

    #[test]
    fn january_scenario_matches_expected_figures() {
        let summary = SummaryService::summarize_month(&january_ledger(), 2026, Month::January);
        let totals = summary.totals;
        assert_eq!(totals.planned_income, dec!(115000));
        assert_eq!(totals.realized_income, dec!(0));
        assert_eq!(totals.pending_income(), dec!(115000));
        assert_eq!(totals.planned_expense, dec!(3611));
        assert_eq!(totals.realized_expense, dec!(3611));
        assert_eq!(totals.pending_expense(), dec!(0));
        assert_eq!(totals.net_cash(), dec!(-3611));
        assert_eq!(summary.entry_count, 2);
        assert!(summary.is_consistent());
    }

    #[test]
    fn summarize_is_idempotent() {
        let ledger = january_ledger();
        let view = PeriodFilter::by_month(&ledger, 2026, Month::January);
        assert_eq!(SummaryService::summarize(&view), SummaryService::summarize(&view));
    }

    #[test]
    fn empty_view_yields_zero_totals() {
        let summary = SummaryService::summarize(&[]);
        assert_eq!(summary.totals, PeriodTotals::default());
        assert_eq!(summary.entry_count, 0);
        assert!(summary.is_consistent());
    }

    #[test]
    fn negative_amounts_surface_as_warnings_not_clamps() {
        let row = LedgerEntry {
            id: EntryId(5),
            entry: entry(1, EntryKind::Expense, dec!(-20), EntryStatus::Pending),
        };
        let summary = SummaryService::summarize(&[&row]);
        assert_eq!(summary.totals.planned_expense, dec!(-20));
        assert!(summary.warnings.contains(&ConsistencyWarning::NegativeAmount {
            id: EntryId(5),
            amount: dec!(-20),
        }));
    }

    #[test]
    fn oversized_amounts_are_reported_and_not_summed() {
        let huge = |id| LedgerEntry {
            id: EntryId(id),
            entry: entry(1, EntryKind::Income, Decimal::MAX, EntryStatus::Settled),
        };
        let normal = LedgerEntry {
            id: EntryId(3),
            entry: entry(1, EntryKind::Income, dec!(10), EntryStatus::Settled),
        };
        let (first, second) = (huge(1), huge(2));
        let summary = SummaryService::summarize(&[&first, &second, &normal]);
        assert_eq!(summary.totals.planned_income, dec!(10));
        assert_eq!(summary.totals.realized_income, dec!(10));
        assert_eq!(summary.entry_count, 3);
        assert!(summary.warnings.contains(&ConsistencyWarning::AmountTooLarge {
            id: EntryId(2),
            amount: Decimal::MAX,
        }));
        assert!(!summary.is_consistent());
    }

    #[test]
    fn negative_pending_entry_reports_negative_pending_income() {
        let settled = LedgerEntry {
            id: EntryId(1),
            entry: entry(1, EntryKind::Income, dec!(50), EntryStatus::Settled),
        };
        let corrupted = LedgerEntry {
            id: EntryId(2),
            entry: entry(1, EntryKind::Income, dec!(-80), EntryStatus::Pending),
        };
        let summary = SummaryService::summarize(&[&settled, &corrupted]);
        assert_eq!(summary.totals.pending_income(), dec!(-80));
        assert!(summary
            .warnings
            .contains(&ConsistencyWarning::NegativePendingIncome { pending: dec!(-80) }));
        assert!(!summary.is_consistent());
    }

    #[test]
    fn monthly_trend_groups_by_month_index() {
        let mut ledger = Ledger::new("Trend");
        ledger.insert([
            entry(3, EntryKind::Expense, dec!(30), EntryStatus::Settled),
            entry(1, EntryKind::Income, dec!(100), EntryStatus::Settled),
            entry(3, EntryKind::Income, dec!(50), EntryStatus::Pending),
        ]);
        let trend = SummaryService::monthly_trend(&ledger, 2026);
        let months: Vec<_> = trend.iter().map(|point| point.month).collect();
        assert_eq!(months, vec![Month::January, Month::March]);
        assert_eq!(trend[1].summary.totals.planned_income, dec!(50));
        assert_eq!(trend[1].summary.totals.realized_expense, dec!(30));

        let full = SummaryService::monthly_trend_full(&ledger, 2026);
        assert_eq!(full.len(), 12);
        assert_eq!(full[1].summary.entry_count, 0);
        assert_eq!(full[2].summary, trend[1].summary);
    }

    #[test]
    fn settlement_ratio_reports_percentage() {
        let totals = PeriodTotals {
            planned_expense: dec!(400),
            realized_expense: dec!(100),
            ..PeriodTotals::default()
        };
        assert_eq!(SummaryService::settlement_ratio(&totals), Some(dec!(25)));
        assert_eq!(
            SummaryService::settlement_ratio(&PeriodTotals::default()),
            None
        );
    }
}
