use crate::error::{LedgerError, Result};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Amounts closer to zero than this are treated as zero when netting.
pub const AMOUNT_EPSILON: f64 = 1e-9;

pub fn is_effectively_zero(amount: f64) -> bool {
    amount.abs() <= AMOUNT_EPSILON
}

/// Rounds to whole cents. Only the presentation layer calls this; aggregation keeps full
/// precision.
pub fn round_currency(amount: f64) -> f64 {
    let rounded = (amount * 100.0).round() / 100.0;
    // avoid "-0.00" in rendered output
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 * 100.0 / total as f64, 2)
}

pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn parse_date(table: &'static str, row: usize, raw: &str, format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), format).map_err(|_| LedgerError::InvalidDate {
        table,
        row,
        value: raw.to_string(),
    })
}

/// Parses a monetary amount, rejecting negative and non-finite values.
pub fn parse_amount(table: &'static str, row: usize, raw: &str) -> Result<f64> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| LedgerError::InvalidAmount {
            table,
            row,
            value: raw.to_string(),
        })?;

    if !amount.is_finite() {
        return Err(LedgerError::InvalidAmount {
            table,
            row,
            value: raw.to_string(),
        });
    }

    if amount < 0.0 {
        return Err(LedgerError::NegativeAmount { table, row, amount });
    }

    Ok(amount)
}

pub fn parse_points(row: usize, raw: &str) -> Result<u32> {
    raw.trim().parse().map_err(|_| LedgerError::InvalidPoints {
        row,
        value: raw.to_string(),
    })
}

/// Splits a delimited list of names, trimming whitespace and dropping blanks and duplicates.
pub fn split_names(raw: &str, delimiter: char) -> BTreeSet<String> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
