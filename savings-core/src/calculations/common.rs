//! Shared helpers for the savings calculations.
//!
//! Values flow through the calculations unrounded; rounding is applied only
//! when figures are displayed or exported.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use savings_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use savings_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Multiplies an amount by a count, saturating instead of overflowing.
pub fn times(
    amount: Decimal,
    count: u32,
) -> Decimal {
    amount.saturating_mul(Decimal::from(count))
}

/// Divides, saturating at the bound matching the quotient's sign when it
/// does not fit. `divisor` must be nonzero.
pub fn saturating_div(
    dividend: Decimal,
    divisor: Decimal,
) -> Decimal {
    dividend.checked_div(divisor).unwrap_or_else(|| {
        if dividend.is_sign_negative() != divisor.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}
