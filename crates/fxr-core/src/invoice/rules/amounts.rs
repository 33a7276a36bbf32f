//! Numeric normalization and floor rounding for rates and amounts.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::ExtractionError;

/// Decimal places kept for exchange rates.
pub const RATE_PRECISION: u32 = 3;

/// Decimal places kept for currency totals.
pub const AMOUNT_PRECISION: u32 = 2;

/// Parse a matched numeric token such as `1,234.50`.
///
/// Thousands commas are stripped before parsing. A comma anywhere else, such
/// as a decimal comma in `0,92`, makes the token malformed, as does anything
/// that is not a base-10 numeral afterwards.
pub fn normalize(field: &str, raw: &str) -> Result<Decimal, ExtractionError> {
    let malformed = || ExtractionError::MalformedNumber {
        field: field.to_string(),
        value: raw.to_string(),
    };

    let cleaned = strip_grouping(raw.trim()).ok_or_else(malformed)?;
    Decimal::from_str(&cleaned).map_err(|_| malformed())
}

/// Remove thousands separators: a leading group of 1-3 digits followed by
/// groups of exactly 3, all before the decimal point.
fn strip_grouping(token: &str) -> Option<String> {
    if !token.contains(',') {
        return Some(token.to_string());
    }

    let (integer, fraction) = match token.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (token, None),
    };
    if fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let mut groups = integer.split(',');
    let lead = groups.next()?.trim_start_matches(['-', '+']);
    if lead.is_empty() || lead.len() > 3 || !groups.all(|g| g.len() == 3) {
        return None;
    }

    Some(token.replace(',', ""))
}

/// Floor `value` to `places` decimal places, toward negative infinity.
///
/// Never rounds up: `0.4447` becomes `0.444` and `-0.4441` becomes `-0.445`.
pub fn round_to(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::ToNegativeInfinity)
}
