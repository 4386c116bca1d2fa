//! CSV export of ledger rows.

use std::{io, path::Path};

use cashbook_domain::{EntryRow, Ledger, LedgerEntry};
use tracing::info;

/// Writes `rows` as CSV with a header line, ordered by date then id.
/// Returns the number of data rows written.
pub fn write_csv<W: io::Write>(writer: W, rows: &[&LedgerEntry]) -> Result<usize, csv::Error> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|row| (row.entry.date, row.id));

    let mut out = csv::Writer::from_writer(writer);
    for row in &sorted {
        out.serialize(EntryRow::from(*row))?;
    }
    if sorted.is_empty() {
        out.write_record(HEADER)?;
    }
    out.flush()?;
    Ok(sorted.len())
}

/// Exports the whole ledger, or only `year` when given, to `path`.
pub fn export_ledger(ledger: &Ledger, year: Option<i32>, path: &Path) -> Result<usize, csv::Error> {
    let rows: Vec<&LedgerEntry> = ledger
        .sorted_by_date()
        .into_iter()
        .filter(|row| year.map_or(true, |year| row.entry.year() == year))
        .collect();
    let file = std::fs::File::create(path)?;
    let written = write_csv(file, &rows)?;
    info!(rows = written, path = %path.display(), "ledger exported");
    Ok(written)
}

const HEADER: [&str; 9] = [
    "id",
    "date",
    "year",
    "month",
    "month_index",
    "description",
    "kind",
    "amount",
    "status",
];
