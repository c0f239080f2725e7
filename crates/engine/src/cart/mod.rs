//! Cart computation engine.
//!
//! The cart is an ordered collection of [`CartLine`]s keyed by [`LineKey`]
//! (product + variant selection + note). Totals are never stored by callers;
//! they are re-derived from the lines after every mutation.

mod engine;
mod line;
mod snapshot;
mod totals;

pub use engine::{AddItemOptions, CartEngine, QuantityChange};
pub use line::{CartLine, LineKey};
pub use snapshot::{CartSnapshot, SnapshotError};
pub use totals::{CartTotals, TaxPolicy, compute_totals, line_discount};
