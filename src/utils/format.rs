//! Display helpers for amounts and percentages.

use rust_decimal::{Decimal, RoundingStrategy};

/// Money display settings taken from the user configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyFormat {
    pub currency: String,
    pub precision: u8,
}

impl MoneyFormat {
    pub fn new(currency: impl Into<String>, precision: u8) -> Self {
        Self {
            currency: currency.into(),
            precision,
        }
    }

    /// `1234.5` with precision 2 and `TRY` renders as `1,234.50 TRY`.
    pub fn amount(&self, value: Decimal) -> String {
        format!("{} {}", format_number(value, self.precision), self.currency)
    }
}

/// Rounds half away from zero and groups thousands with `,`.
pub fn format_number(value: Decimal, precision: u8) -> String {
    let rounded = value.round_dp_with_strategy(
        u32::from(precision),
        RoundingStrategy::MidpointAwayFromZero,
    );
    let body = format!("{:.*}", precision as usize, rounded.abs());
    let (int_part, fraction) = match body.find('.') {
        Some(pos) => body.split_at(pos),
        None => (body.as_str(), ""),
    };
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{}{fraction}", group_digits(int_part))
}

pub fn format_percent(value: Decimal) -> String {
    format!("{}%", value.normalize())
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
