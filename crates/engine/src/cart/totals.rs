//! Derived cart totals and the badge discount rule table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pineapple_pos_core::{Badge, round_money};

use super::line::CartLine;

/// Share of the line subtotal taken off by the `percent-off` badge.
const PERCENT_OFF_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Sales tax applied to the discounted subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaxPolicy {
    /// Fraction of the taxable amount, e.g. `0.0825`.
    pub rate: Decimal,
}

impl TaxPolicy {
    /// No tax.
    pub const EXEMPT: Self = Self { rate: Decimal::ZERO };

    #[must_use]
    pub const fn new(rate: Decimal) -> Self {
        Self { rate }
    }
}

/// Totals derived from the current cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub item_count: u32,
}

/// Discount for one line, from the badge captured when the line was created.
///
/// Only `percent-off` has a rule today; every other badge is reserved and
/// discounts nothing.
#[must_use]
pub fn line_discount(badge: Option<Badge>, line_subtotal: Decimal) -> Decimal {
    match badge {
        Some(Badge::PercentOff) => line_subtotal.saturating_mul(PERCENT_OFF_RATE),
        Some(Badge::Special | Badge::Limited | Badge::LowStock | Badge::NeedsReward) | None => {
            Decimal::ZERO
        }
    }
}

/// Re-derive totals from scratch.
///
/// Pure: the same lines and policy always produce the same totals. Sums
/// saturate at `Decimal::MAX` instead of overflowing.
#[must_use]
pub fn compute_totals(lines: &[CartLine], tax: &TaxPolicy) -> CartTotals {
    let mut subtotal = Decimal::ZERO;
    let mut discount = Decimal::ZERO;
    let mut item_count: u32 = 0;

    for line in lines {
        let line_subtotal = line.subtotal();
        subtotal = subtotal.saturating_add(line_subtotal);
        discount = discount.saturating_add(line_discount(line.badge(), line_subtotal));
        item_count = item_count.saturating_add(line.quantity());
    }

    let subtotal = round_money(subtotal);
    let discount = round_money(discount);
    let taxable = subtotal.saturating_sub(discount);
    let tax = round_money(taxable.saturating_mul(tax.rate));
    let total = round_money(taxable.saturating_add(tax));

    CartTotals {
        subtotal,
        discount,
        tax,
        total,
        item_count,
    }
}
