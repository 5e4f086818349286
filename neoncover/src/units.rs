//! Conversion between on-chain base units and display strings.
//!
//! Amounts cross the contract boundary as 18-decimal integers. These two
//! functions are the only place that representation changes, so every
//! display string in the crate carries the same precision.

use alloy::primitives::U256;

use crate::error::UnitsError;

/// Decimals of the native currency and the pool token.
pub const TOKEN_DECIMALS: usize = 18;

/// Fractional digits kept in display strings.
pub const DISPLAY_DECIMALS: usize = 4;

const BASE_PER_UNIT: u64 = 1_000_000_000_000_000_000;
const DISPLAY_STEP: u64 = 100_000_000_000_000;

/// Convert a base-unit integer into a display string.
///
/// Truncates to [`DISPLAY_DECIMALS`] fractional digits; zero renders as
/// `"0.0000"`.
#[must_use]
pub fn to_display(value: U256) -> String {
    let unit = U256::from(BASE_PER_UNIT);
    let whole = value / unit;
    let frac = ((value % unit) / U256::from(DISPLAY_STEP)).to_string();
    format!("{whole}.{frac:0>width$}", width = DISPLAY_DECIMALS)
}

/// Parse a non-negative decimal display amount into base units.
pub fn to_base_units(amount: &str) -> Result<U256, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(UnitsError::Malformed(amount.to_owned()));
    }
    if frac.len() > TOKEN_DECIMALS {
        return Err(UnitsError::TooPrecise {
            amount: amount.to_owned(),
            max: TOKEN_DECIMALS,
        });
    }

    let overflow = || UnitsError::Overflow(amount.to_owned());
    let whole = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).map_err(|_| overflow())?
    };
    let frac = if frac.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{frac:0<width$}", width = TOKEN_DECIMALS);
        U256::from_str_radix(&padded, 10).map_err(|_| overflow())?
    };

    whole
        .checked_mul(U256::from(BASE_PER_UNIT))
        .and_then(|base| base.checked_add(frac))
        .ok_or_else(overflow)
}
