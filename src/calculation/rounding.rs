//! Monetary rounding.
//!
//! Contribution amounts are carried at full precision through evaluation and
//! rounded once, when a line is produced. Rounding is half-up to the cent.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept on monetary amounts.
pub const CENT_SCALE: u32 = 2;

/// Rounds an amount to cents, half away from zero.
///
/// Contribution amounts are never negative, so this is round-half-up.
///
/// # Examples
///
/// ```
/// use contribution_engine::calculation::round_to_cents;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_to_cents(Decimal::from_str("276.345").unwrap()), Decimal::from_str("276.35").unwrap());
/// assert_eq!(round_to_cents(Decimal::from_str("85.968").unwrap()), Decimal::from_str("85.97").unwrap());
/// assert_eq!(round_to_cents(Decimal::from_str("0.004").unwrap()), Decimal::from_str("0.00").unwrap());
/// ```
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
