//! Currency conversion arithmetic.
//!
//! CRITICAL: Rounding strategy for normalized amounts:
//! - Always round to `NORMALIZED_DECIMAL_PLACES`
//! - Use banker's rounding (round half to even)
//! - Store both original and normalized amounts

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

use crate::currency::error::CurrencyError;

/// Scale of every normalized (base currency) amount.
pub const NORMALIZED_DECIMAL_PLACES: u32 = 4;

/// Exclusive upper bound of a stored amount: `NUMERIC(19,4)` keeps 15
/// integer digits.
pub const MAX_STORABLE_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Checks that an amount fits the money columns without rounding.
///
/// # Errors
///
/// Returns `CurrencyError::OutOfRange` for 15+ integer digits or more than
/// `NORMALIZED_DECIMAL_PLACES` fractional digits.
pub fn ensure_storable(amount: Decimal) -> Result<(), CurrencyError> {
    if amount.abs() >= MAX_STORABLE_AMOUNT {
        return Err(CurrencyError::OutOfRange(format!(
            "{amount} exceeds 15 integer digits"
        )));
    }
    if amount.normalize().scale() > NORMALIZED_DECIMAL_PLACES {
        return Err(CurrencyError::OutOfRange(format!(
            "{amount} has more than {NORMALIZED_DECIMAL_PLACES} decimal places"
        )));
    }
    Ok(())
}

/// Converts an amount using the given exchange rate.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
///
/// # Errors
///
/// Returns `CurrencyError::OutOfRange` when the product overflows `Decimal`
/// or does not fit the money columns.
pub fn convert_amount(
    amount: Decimal,
    rate: Decimal,
    decimal_places: u32,
) -> Result<Decimal, CurrencyError> {
    let converted = amount
        .checked_mul(rate)
        .ok_or_else(|| CurrencyError::OutOfRange(format!("{amount} x {rate} overflows")))?
        .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven);
    ensure_storable(converted)?;
    Ok(converted)
}

/// Inverts a rate (`1 / rate`), or `None` for a zero rate.
#[must_use]
pub fn invert_rate(rate: Decimal) -> Option<Decimal> {
    if rate.is_zero() {
        None
    } else {
        Decimal::ONE.checked_div(rate)
    }
}
