use rust_decimal::prelude::*;
use std::str::FromStr;

/// Rounds `value` to `precision` fractional digits, half away from zero.
///
/// Rounding happens on the shortest decimal form of the float, so a value
/// printed as `55.555` rounds to `55.56` even though its binary form is
/// slightly below the midpoint.
pub fn round(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // Display never uses exponent notation, which Decimal::from_str would reject.
    let Ok(decimal) = Decimal::from_str(&value.to_string()) else {
        return value;
    };
    decimal
        .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(value)
}
