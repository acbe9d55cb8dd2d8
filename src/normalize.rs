//! Unit conversion for vendor feed fields.
//!
//! The vendor suppresses exact low counts: a single unit is reported as out
//! of stock and anything above ten arrives as the `">10"` sentinel.

use crate::error::{Result, SyncError};

/// Quantity sentinel used by the vendor for "more than ten in stock"
pub const OVERFLOW_SENTINEL: &str = ">10";
/// Stock published for `OVERFLOW_SENTINEL`
pub const OVERFLOW_QUANTITY: u32 = 100;
/// Quantity the vendor reports for a single remaining unit
pub const SINGLE_UNIT: &str = "1";
/// Stock published for `SINGLE_UNIT`
pub const SINGLE_UNIT_QUANTITY: u32 = 0;

/// Normalizes a feed quantity string to the stock level pushed to marketplaces.
///
/// `offer_id` is only used to make the error message actionable.
///
/// # Examples
/// - ">10" -> 100
/// - "1" -> 0
/// - "7" -> 7
pub fn normalize_quantity(offer_id: &str, quantity: &str) -> Result<u32> {
    let quantity = quantity.trim();
    match quantity {
        OVERFLOW_SENTINEL => Ok(OVERFLOW_QUANTITY),
        SINGLE_UNIT => Ok(SINGLE_UNIT_QUANTITY),
        other => other.parse::<u32>().map_err(|_| {
            log::warn!("Unparsable quantity '{other}' for offer {offer_id}");
            SyncError::MalformedQuantity {
                offer_id: offer_id.to_string(),
                value: other.to_string(),
            }
        }),
    }
}

/// Strips a human-formatted currency string down to its integer part.
///
/// Everything from the first `.` on is dropped, then every non-digit.
///
/// # Examples
/// - "5'990.00 руб." -> "5990"
/// - "100.00 x" -> "100"
pub fn normalize_price(price: &str) -> Result<String> {
    let (integer_part, _) = price
        .split_once('.')
        .ok_or_else(|| SyncError::MalformedPrice(price.to_string()))?;

    let digits: String = integer_part.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(SyncError::MalformedPrice(price.to_string()));
    }

    log::debug!("Normalized price '{price}' to {digits}");
    Ok(digits)
}

/// Like [`normalize_price`], returning the numeric amount.
pub fn parse_price_amount(price: &str) -> Result<u64> {
    normalize_price(price)?
        .parse::<u64>()
        .map_err(|_| SyncError::MalformedPrice(price.to_string()))
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
