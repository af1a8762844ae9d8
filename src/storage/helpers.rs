//! Shared storage helper functions.
//!
//! Money and timestamp conversions used by the storage backends.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{Result, StorageError};

/// Convert a money amount to integer cents.
///
/// Fails if the amount has more than two fractional digits or does not fit
/// in an `i64`.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    let cents = amount * Decimal::ONE_HUNDRED;
    if !cents.fract().is_zero() {
        return Err(StorageError::InvalidAmount(amount));
    }
    cents.to_i64().ok_or(StorageError::InvalidAmount(amount))
}

/// Convert integer cents back to a two-digit decimal amount.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Format a timestamp for storage. Fixed width, so text order is time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored RFC3339 timestamp.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StorageError::InvalidTimestamp(value.to_string()))
}
