//! Domain models for ledger entries.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::Month;

/// Largest amount a single entry may carry (10^15). Period totals of capped
/// entries stay far below the `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Ledger-assigned identifier, unique for the lifetime of a ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Direction of a cash movement.
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    /// Parses user-facing labels, including the legacy Turkish ones.
    pub fn parse(value: &str) -> Option<EntryKind> {
        match value.trim().to_lowercase().as_str() {
            "income" | "in" | "gelir" => Some(EntryKind::Income),
            "expense" | "out" | "gider" => Some(EntryKind::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Income => "Income",
            EntryKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Settlement state of an entry.
pub enum EntryStatus {
    #[default]
    Pending,
    Settled,
}

impl EntryStatus {
    pub fn parse(value: &str) -> Option<EntryStatus> {
        match value.trim().to_lowercase().as_str() {
            "pending" | "planned" | "bekliyor" => Some(EntryStatus::Pending),
            "settled" | "paid" | "done" | "ödendi" | "odendi" => Some(EntryStatus::Settled),
            _ => None,
        }
    }

    pub fn is_settled(self) -> bool {
        matches!(self, EntryStatus::Settled)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryStatus::Pending => "Pending",
            EntryStatus::Settled => "Settled",
        };
        f.write_str(label)
    }
}

/// One planned or actual cash movement.
///
/// `year`, `month` and `month_index` are derived from `date` on demand so they
/// can never disagree with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub date: NaiveDate,
    pub description: String,
    pub kind: EntryKind,
    pub amount: Decimal,
    #[serde(default)]
    pub status: EntryStatus,
}

impl Entry {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        kind: EntryKind,
        amount: Decimal,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            kind,
            amount,
            status: EntryStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> Month {
        Month::of(self.date)
    }

    pub fn month_index(&self) -> u32 {
        self.date.month()
    }

    pub fn is_income(&self) -> bool {
        self.kind == EntryKind::Income
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }
}

/// An entry as stored in a ledger, paired with its identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: EntryId,
    #[serde(flatten)]
    pub entry: Entry,
}

/// Normalized output row handed to tables and exporters.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntryRow {
    pub id: u64,
    pub date: NaiveDate,
    pub year: i32,
    pub month: Month,
    pub month_index: u32,
    pub description: String,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub status: EntryStatus,
}

impl From<&LedgerEntry> for EntryRow {
    fn from(row: &LedgerEntry) -> Self {
        let entry = &row.entry;
        Self {
            id: row.id.0,
            date: entry.date,
            year: entry.year(),
            month: entry.month(),
            month_index: entry.month_index(),
            description: entry.description.clone(),
            kind: entry.kind,
            amount: entry.amount,
            status: entry.status,
        }
    }
}
