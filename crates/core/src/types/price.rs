//! Decimal money helpers.
//!
//! Prices are plain [`Decimal`] amounts in the store's single currency. All
//! derived amounts (discounts, tax, totals) are rounded to cents with
//! banker's rounding so that repeated recomputation never drifts.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places money amounts are rounded to.
pub const MONEY_SCALE: u32 = 2;

/// Largest unit price a product may carry (one billion).
///
/// Keeps `price * quantity` far inside `Decimal` range for any `u32` quantity.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Round an amount to cents using round-half-to-even.
///
/// ```
/// use pineapple_pos_core::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(1_125, 3)), Decimal::new(112, 2));
/// assert_eq!(round_money(Decimal::new(1_135, 3)), Decimal::new(114, 2));
/// ```
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}
