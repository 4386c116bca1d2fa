//! Planned vs. realized totals for a period.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{calendar::Month, entry::EntryId};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
/// Raw sums over a set of entries.
///
/// Realized sums only count settled entries, which are also counted in the
/// planned sums, so the pending figures are never negative for valid data.
pub struct PeriodTotals {
    pub planned_income: Decimal,
    pub planned_expense: Decimal,
    pub realized_income: Decimal,
    pub realized_expense: Decimal,
}

impl PeriodTotals {
    pub fn pending_income(&self) -> Decimal {
        self.planned_income - self.realized_income
    }

    pub fn pending_expense(&self) -> Decimal {
        self.planned_expense - self.realized_expense
    }

    /// Cash actually moved: settled income minus settled expense.
    pub fn net_cash(&self) -> Decimal {
        self.realized_income - self.realized_expense
    }

    /// Expected balance once every planned entry settles.
    pub fn planned_net(&self) -> Decimal {
        self.planned_income - self.planned_expense
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Data-quality problems detected while aggregating. Never fatal.
pub enum ConsistencyWarning {
    NegativePendingIncome { pending: Decimal },
    NegativePendingExpense { pending: Decimal },
    NegativeAmount { id: EntryId, amount: Decimal },
    /// Left out of the totals.
    AmountTooLarge { id: EntryId, amount: Decimal },
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyWarning::NegativePendingIncome { pending } => {
                write!(f, "pending income is negative ({pending})")
            }
            ConsistencyWarning::NegativePendingExpense { pending } => {
                write!(f, "pending expense is negative ({pending})")
            }
            ConsistencyWarning::NegativeAmount { id, amount } => {
                write!(f, "entry {id} carries a negative amount ({amount})")
            }
            ConsistencyWarning::AmountTooLarge { id, amount } => {
                write!(f, "entry {id} exceeds the maximum amount ({amount}) and was not counted")
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
/// Totals for one period together with anything suspicious found on the way.
pub struct PeriodSummary {
    pub totals: PeriodTotals,
    pub entry_count: usize,
    #[serde(default)]
    pub warnings: Vec<ConsistencyWarning>,
}

impl PeriodSummary {
    pub fn is_consistent(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// One point of a month-over-month trend.
pub struct MonthlySummary {
    pub month: Month,
    pub summary: PeriodSummary,
}
