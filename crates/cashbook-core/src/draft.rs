//! Boundary validation for rows coming from forms, scripts and edit sheets.
//!
//! Collaborators hand over loosely typed rows; nothing reaches the ledger
//! until it has been turned into a typed [`Entry`] here.

use std::str::FromStr;

use cashbook_domain::{Entry, EntryId, EntryKind, EntryStatus, LedgerEntry, MAX_AMOUNT};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// Amount as typed by the user: either a JSON number or free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawAmount {
    Number(Decimal),
    Text(String),
}

impl RawAmount {
    fn parse(&self) -> Result<Decimal, String> {
        match self {
            RawAmount::Number(value) => Ok(*value),
            RawAmount::Text(text) => normalize_amount(text)
                .and_then(|normalized| Decimal::from_str(&normalized).ok())
                .ok_or_else(|| format!("malformed amount `{}`", text.trim())),
        }
    }
}

/// Rewrites a typed amount into `Decimal` syntax.
///
/// Both `.` and `,` are accepted as separators. With both present, the last
/// one is the decimal point (`1.250,50`, `1,250.50`). A lone `,` followed by
/// exactly three digits, or a separator repeated several times, groups
/// thousands (`1,250`, `1.250.000`). Any other lone separator is the decimal
/// point (`12,5`, `1.250`). Grouping must be in threes or the amount is
/// refused.
fn normalize_amount(text: &str) -> Option<String> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let (sign, digits) = match compact.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", compact.strip_prefix('+').unwrap_or(&compact)),
    };

    let separators: Vec<(usize, char)> = digits
        .char_indices()
        .filter(|(_, c)| matches!(c, '.' | ','))
        .collect();
    let (integer, fraction) = match separators.last() {
        None => (digits, None),
        Some(&(index, last)) => {
            let repeated = separators.len() > 1 && separators.iter().all(|(_, c)| *c == last);
            let comma_thousands =
                separators.len() == 1 && last == ',' && digits.len() - index - 1 == 3;
            if repeated || comma_thousands {
                (digits, None)
            } else {
                (&digits[..index], Some((last, &digits[index + 1..])))
            }
        }
    };

    let groups: Vec<&str> = integer.split(['.', ',']).collect();
    if groups.len() > 1 {
        let grouping: Vec<char> = integer.chars().filter(|c| matches!(c, '.' | ',')).collect();
        let uniform = grouping.windows(2).all(|pair| pair[0] == pair[1]);
        let clashes = fraction.map_or(false, |(point, _)| grouping.contains(&point));
        let well_formed = (1..=3).contains(&groups[0].len())
            && groups[1..].iter().all(|group| group.len() == 3);
        if !uniform || clashes || !well_formed {
            return None;
        }
    }
    if !groups.iter().all(|group| group.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let mut normalized = format!("{sign}{}", groups.concat());
    if let Some((_, fraction)) = fraction {
        if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        normalized.push('.');
        normalized.push_str(fraction);
    }
    Some(normalized)
}

/// Range every stored amount must fall in: `0..=MAX_AMOUNT`.
pub(crate) fn check_amount(amount: Decimal) -> Result<(), String> {
    if amount < Decimal::ZERO {
        return Err(format!("amount must not be negative (got {amount})"));
    }
    if amount > MAX_AMOUNT {
        return Err(format!("amount must not exceed {MAX_AMOUNT} (got {amount})"));
    }
    Ok(())
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

impl From<Decimal> for RawAmount {
    fn from(value: Decimal) -> Self {
        RawAmount::Number(value)
    }
}

/// Input row shape: one entry as submitted, plus how many monthly
/// installments it should expand to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryDraft {
    pub date: String,
    #[serde(default)]
    pub description: String,
    pub kind: String,
    pub amount: RawAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
}

impl EntryDraft {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        kind: impl Into<String>,
        amount: impl Into<RawAmount>,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            kind: kind.into(),
            amount: amount.into(),
            status: None,
            installments: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_installments(mut self, installments: u32) -> Self {
        self.installments = Some(installments);
        self
    }

    /// Converts the draft into a typed entry and its installment count.
    pub fn validate(&self) -> Result<(Entry, u32), CoreError> {
        self.check().map_err(CoreError::InvalidInput)
    }

    pub(crate) fn check(&self) -> Result<(Entry, u32), String> {
        let date = parse_date(&self.date)?;
        let kind = EntryKind::parse(&self.kind)
            .ok_or_else(|| format!("unrecognized kind `{}`", self.kind.trim()))?;
        let status = match self.status.as_deref() {
            None => EntryStatus::Pending,
            Some(raw) if raw.trim().is_empty() => EntryStatus::Pending,
            Some(raw) => EntryStatus::parse(raw)
                .ok_or_else(|| format!("unrecognized status `{}`", raw.trim()))?,
        };
        let amount = self.amount.parse()?;
        check_amount(amount)?;
        let installments = self.installments.unwrap_or(1);
        if installments < 1 {
            return Err("installments must be at least 1".into());
        }
        let entry = Entry {
            date,
            description: self.description.clone(),
            kind,
            amount,
            status,
        };
        Ok((entry, installments))
    }
}

impl From<&Entry> for EntryDraft {
    fn from(entry: &Entry) -> Self {
        Self {
            date: entry.date.format("%Y-%m-%d").to_string(),
            description: entry.description.clone(),
            kind: entry.kind.to_string().to_lowercase(),
            amount: RawAmount::Number(entry.amount),
            status: Some(entry.status.to_string().to_lowercase()),
            installments: None,
        }
    }
}

/// One row of an edited view. Rows without an id are additions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditedRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    #[serde(flatten)]
    pub draft: EntryDraft,
}

impl EditedRow {
    pub fn existing(id: EntryId, draft: EntryDraft) -> Self {
        Self { id: Some(id), draft }
    }

    pub fn added(draft: EntryDraft) -> Self {
        Self { id: None, draft }
    }
}

impl From<&LedgerEntry> for EditedRow {
    fn from(row: &LedgerEntry) -> Self {
        Self::existing(row.id, EntryDraft::from(&row.entry))
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| format!("malformed date `{trimmed}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn validate_builds_typed_entry() {
        let draft = EntryDraft::new("2026-01-07", "Loan", "expense", "40000")
            .with_status("settled")
            .with_installments(3);
        let (entry, installments) = draft.validate().expect("valid draft");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2026, 1, 7).unwrap());
        assert_eq!(entry.description, "Loan");
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.amount, dec!(40000));
        assert_eq!(entry.status, EntryStatus::Settled);
        assert_eq!(installments, 3);
    }

    #[test]
    fn validate_accepts_dotted_dates_and_comma_decimals() {
        let draft = EntryDraft::new("07.01.2026", "Market", "gider", "1 250,50");
        let (entry, installments) = draft.validate().unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2026, 1, 7).unwrap());
        assert_eq!(entry.amount, dec!(1250.50));
        assert_eq!(installments, 1);
    }

    #[test]
    fn separators_follow_the_last_decimal_mark() {
        let cases = [
            ("1.250,50", dec!(1250.50)),
            ("1,250.50", dec!(1250.50)),
            ("1,250", dec!(1250)),
            ("1.250.000", dec!(1250000)),
            ("1,250,000.75", dec!(1250000.75)),
            ("12,5", dec!(12.5)),
            ("1,25", dec!(1.25)),
            ("1.250", dec!(1.250)),
            ("-3,75", dec!(-3.75)),
            ("40000", dec!(40000)),
        ];
        for (raw, expected) in cases {
            let amount = RawAmount::from(raw).parse().unwrap();
            assert_eq!(amount, expected, "{raw}");
        }
    }

    #[test]
    fn ambiguous_grouping_is_refused() {
        for raw in ["1,2,3", "1.2,5", "12,50.5", "1.250.5,00", "1,,0", "12.", "1.2.3.4", "1x5"] {
            assert!(RawAmount::from(raw).parse().is_err(), "{raw}");
        }
    }

    #[test]
    fn amounts_beyond_the_cap_are_rejected() {
        let draft = EntryDraft::new("2026-01-01", "x", "income", "79228162514264337593543950335");
        let err = draft.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"), "{err}");
        let at_cap = EntryDraft::new("2026-01-01", "x", "income", "1.000.000.000.000.000");
        assert_eq!(at_cap.validate().unwrap().0.amount, MAX_AMOUNT);
    }

    #[test]
    fn description_is_kept_verbatim() {
        let draft = EntryDraft::new("2026-01-01", "  Rent  (flat 2) ", "expense", "1");
        assert_eq!(draft.validate().unwrap().0.description, "  Rent  (flat 2) ");
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let cases = [
            EntryDraft::new("2026-02-30", "x", "income", "1"),
            EntryDraft::new("2026-02-01", "x", "transfer", "1"),
            EntryDraft::new("2026-02-01", "x", "income", "-1"),
            EntryDraft::new("2026-02-01", "x", "income", "abc"),
            EntryDraft::new("2026-02-01", "x", "income", "1").with_status("maybe"),
            EntryDraft::new("2026-02-01", "x", "income", "1").with_installments(0),
        ];
        for draft in cases {
            let err = draft.validate().expect_err("draft must be rejected");
            assert!(matches!(err, CoreError::InvalidInput(_)), "{err:?}");
        }
    }

    #[test]
    fn edited_rows_deserialize_with_optional_id() {
        let json = r#"[
            {"id": 3, "date": "2026-01-02", "description": "Rent", "kind": "EXPENSE", "amount": 900, "status": "PENDING"},
            {"date": "2026-01-09", "description": "Bonus", "kind": "income", "amount": "250.5"}
        ]"#;
        let rows: Vec<EditedRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].id, Some(EntryId(3)));
        assert_eq!(rows[1].id, None);
        let (bonus, _) = rows[1].draft.validate().unwrap();
        assert_eq!(bonus.amount, dec!(250.5));
    }

    #[test]
    fn draft_from_entry_validates_back_to_same_entry() {
        let entry = Entry::new(
            NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(),
            "Insurance",
            EntryKind::Expense,
            dec!(77.25),
        )
        .with_status(EntryStatus::Settled);
        let (back, _) = EntryDraft::from(&entry).validate().unwrap();
        assert_eq!(back, entry);
    }
}
