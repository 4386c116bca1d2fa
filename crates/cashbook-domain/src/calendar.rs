//! Calendar helpers: canonical month names and month arithmetic.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One of the twelve canonical calendar months.
///
/// Names are fixed to English regardless of the user's locale; ordering and
/// sorting always go through [`Month::index`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Returns the 1-based month number.
    pub fn index(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_index(index: u32) -> Option<Month> {
        if (1..=12).contains(&index) {
            Some(Self::ALL[(index - 1) as usize])
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Month {
        Self::ALL[date.month0() as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Turkish label, folded to ASCII.
    fn turkish_name(self) -> &'static str {
        match self {
            Month::January => "ocak",
            Month::February => "subat",
            Month::March => "mart",
            Month::April => "nisan",
            Month::May => "mayis",
            Month::June => "haziran",
            Month::July => "temmuz",
            Month::August => "agustos",
            Month::September => "eylul",
            Month::October => "ekim",
            Month::November => "kasim",
            Month::December => "aralik",
        }
    }
}

/// Lowercases and maps Turkish letters to their ASCII base (`ş` to `s`).
fn fold_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\u{307}')
        .map(|c| match c {
            'ç' => 'c',
            'ğ' => 'g',
            'ı' => 'i',
            'ö' => 'o',
            'ş' => 's',
            'ü' => 'u',
            other => other,
        })
        .collect()
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised when a month label is neither a known name nor a number in 1..=12.
pub struct ParseMonthError(pub String);

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown month `{}`", self.0)
    }
}

impl std::error::Error for ParseMonthError {}

impl FromStr for Month {
    type Err = ParseMonthError;

    /// Accepts `3`, `03`, `march`, `Mar`, `Şubat`, `agu` and similar
    /// spellings: numbers, or 3+ letter prefixes of English or Turkish names.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(number) = trimmed.parse::<u32>() {
            return Month::from_index(number).ok_or_else(|| ParseMonthError(trimmed.into()));
        }
        let needle = fold_label(trimmed);
        if needle.chars().count() < 3 {
            return Err(ParseMonthError(trimmed.into()));
        }
        Month::ALL
            .iter()
            .copied()
            .find(|month| {
                month.name().to_ascii_lowercase().starts_with(&needle)
                    || month.turkish_name().starts_with(&needle)
            })
            .ok_or_else(|| ParseMonthError(trimmed.into()))
    }
}

/// Adds `months` calendar months to `date`, clamping the day to the last valid
/// day of the target month. Returns `None` only outside chrono's date range.
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let zero_based = date.year() * 12 + date.month0() as i32 + months;
    let year = zero_based.div_euclid(12);
    let month = zero_based.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Number of days in the given month, or `None` for an invalid month/year.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((first_next - Duration::days(1)).day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_parses_names_and_numbers() {
        assert_eq!("3".parse::<Month>(), Ok(Month::March));
        assert_eq!("12".parse::<Month>(), Ok(Month::December));
        assert_eq!("sep".parse::<Month>(), Ok(Month::September));
        assert_eq!("January".parse::<Month>(), Ok(Month::January));
        assert!("13".parse::<Month>().is_err());
        assert!("ju".parse::<Month>().is_err());
    }

    #[test]
    fn month_parses_turkish_labels() {
        assert_eq!("Ocak".parse::<Month>(), Ok(Month::January));
        assert_eq!("Şubat".parse::<Month>(), Ok(Month::February));
        assert_eq!("subat".parse::<Month>(), Ok(Month::February));
        assert_eq!("MAYIS".parse::<Month>(), Ok(Month::May));
        assert_eq!("Ağustos".parse::<Month>(), Ok(Month::August));
        assert_eq!("eylül".parse::<Month>(), Ok(Month::September));
        assert_eq!("Kasım".parse::<Month>(), Ok(Month::November));
        assert_eq!("Aralık".parse::<Month>(), Ok(Month::December));
        assert_eq!("eki".parse::<Month>(), Ok(Month::October));
        assert_eq!("İçerik".parse::<Month>().unwrap_err().0, "İçerik");
        assert!("ağ".parse::<Month>().is_err());
    }

    #[test]
    fn month_index_roundtrips() {
        for month in Month::ALL {
            assert_eq!(Month::from_index(month.index()), Some(month));
        }
        assert_eq!(Month::from_index(0), None);
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(date(2026, 1, 31), 1), Some(date(2026, 2, 28)));
        assert_eq!(add_months(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(add_months(date(2026, 3, 31), 1), Some(date(2026, 4, 30)));
    }

    #[test]
    fn add_months_wraps_years_both_ways() {
        assert_eq!(add_months(date(2025, 11, 15), 3), Some(date(2026, 2, 15)));
        assert_eq!(add_months(date(2026, 1, 15), -1), Some(date(2025, 12, 15)));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2100, 2), Some(28));
        assert_eq!(days_in_month(2026, 12), Some(31));
        assert_eq!(days_in_month(2026, 13), None);
    }
}
