use chrono::{DateTime, Utc};
use log::*;
use pix_common::Cents;

/// Mercado Pago reports expiry dates as ISO-8601 timestamps with an offset, e.g. `2024-05-01T12:00:00.000-04:00`.
/// Values that cannot be parsed are logged and discarded rather than failing the whole response.
pub fn parse_expiration(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            warn!("💳️ Could not parse PIX expiration date '{value}'. {e}");
            None
        },
    }
}

/// Mercado Pago expects `transaction_amount` as a decimal number in major units.
pub fn transaction_amount(amount: Cents) -> f64 {
    amount.as_major_units()
}
