//! The ledger: every entry of one household book, keyed by identifier.

use std::{collections::HashSet, fmt};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entry::{Entry, EntryId, LedgerEntry, MAX_AMOUNT};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Owns all entries of one book.
///
/// Rows are kept in ascending identifier order. Identifiers come from a
/// counter that only moves forward, so removed ids are never handed out again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "LedgerRecord")]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
    next_id: u64,
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
            next_id: 1,
            entries: Vec::new(),
        }
    }

    /// Appends entries, returning the identifiers assigned to them in order.
    pub fn insert<I>(&mut self, entries: I) -> Vec<EntryId>
    where
        I: IntoIterator<Item = Entry>,
    {
        let mut ids = Vec::new();
        for entry in entries {
            let id = EntryId(self.next_id);
            self.next_id += 1;
            self.entries.push(LedgerEntry { id, entry });
            ids.push(id);
        }
        if !ids.is_empty() {
            self.touch();
        }
        ids
    }

    /// All rows in identifier order.
    pub fn all(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&LedgerEntry> {
        self.position(id).map(|idx| &self.entries[idx])
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.position(id).is_some()
    }

    /// Overwrites the entry stored under `id`, returning the previous value.
    pub fn replace(&mut self, id: EntryId, entry: Entry) -> Option<Entry> {
        let idx = self.position(id)?;
        let previous = std::mem::replace(&mut self.entries[idx].entry, entry);
        self.touch();
        Some(previous)
    }

    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let idx = self.position(id)?;
        let removed = self.entries.remove(idx);
        self.touch();
        Some(removed.entry)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.iter().map(|row| row.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifier the next inserted entry will receive.
    pub fn next_id(&self) -> EntryId {
        EntryId(self.next_id)
    }

    /// Rows ordered chronologically; equal dates fall back to identifier order.
    pub fn sorted_by_date(&self) -> Vec<&LedgerEntry> {
        let mut rows: Vec<&LedgerEntry> = self.entries.iter().collect();
        rows.sort_by_key(|row| (row.entry.date, row.id));
        rows
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |row| row.id).ok()
    }
}

/// Serialized form of a [`Ledger`], validated on the way in.
#[derive(Debug, Deserialize)]
struct LedgerRecord {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default = "LedgerRecord::schema_version_default")]
    schema_version: u8,
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    entries: Vec<LedgerEntry>,
}

impl LedgerRecord {
    fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Reasons a stored ledger snapshot is refused.
pub enum LedgerSnapshotError {
    DuplicateId(EntryId),
    NegativeAmount(EntryId),
    AmountTooLarge(EntryId),
    UnsupportedSchema(u8),
}

impl fmt::Display for LedgerSnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerSnapshotError::DuplicateId(id) => write!(f, "duplicate entry id {id}"),
            LedgerSnapshotError::NegativeAmount(id) => {
                write!(f, "entry {id} has a negative amount")
            }
            LedgerSnapshotError::AmountTooLarge(id) => {
                write!(f, "entry {id} exceeds the maximum amount {MAX_AMOUNT}")
            }
            LedgerSnapshotError::UnsupportedSchema(version) => {
                write!(f, "unsupported ledger schema version {version}")
            }
        }
    }
}

impl std::error::Error for LedgerSnapshotError {}

impl TryFrom<LedgerRecord> for Ledger {
    type Error = LedgerSnapshotError;

    fn try_from(record: LedgerRecord) -> Result<Self, Self::Error> {
        if record.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(LedgerSnapshotError::UnsupportedSchema(
                record.schema_version,
            ));
        }
        let mut seen = HashSet::new();
        for row in &record.entries {
            if !seen.insert(row.id) {
                return Err(LedgerSnapshotError::DuplicateId(row.id));
            }
            if row.entry.amount < Decimal::ZERO {
                return Err(LedgerSnapshotError::NegativeAmount(row.id));
            }
            if row.entry.amount > MAX_AMOUNT {
                return Err(LedgerSnapshotError::AmountTooLarge(row.id));
            }
        }
        let mut entries = record.entries;
        entries.sort_by_key(|row| row.id);
        let highest = entries.last().map(|row| row.id.0).unwrap_or(0);
        Ok(Ledger {
            id: record.id,
            name: record.name,
            created_at: record.created_at,
            updated_at: record.updated_at,
            schema_version: record.schema_version,
            next_id: record.next_id.max(highest + 1),
            entries,
        })
    }
}
