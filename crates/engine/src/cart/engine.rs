//! The cart engine: the single owner of the active basket.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use pineapple_pos_core::{Badge, Product, VariantSelection};

use super::line::{CartLine, LineKey};
use super::totals::{CartTotals, TaxPolicy, compute_totals};
use crate::notify::{EngineEvent, Notifier};

/// Options for a single add-to-cart call.
///
/// A `quantity` of zero is treated as one; every call adds at least one unit.
#[derive(Debug, Clone, Default)]
pub struct AddItemOptions {
    pub quantity: u32,
    pub note: String,
    pub variant: VariantSelection,
    /// Replaces the product's badge on a newly created line.
    pub badge_override: Option<Badge>,
}

impl AddItemOptions {
    #[must_use]
    pub const fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    #[must_use]
    pub fn variant(mut self, variant: VariantSelection) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub const fn badge_override(mut self, badge: Badge) -> Self {
        self.badge_override = Some(badge);
        self
    }
}

/// Outcome of a quantity stepper change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has this quantity.
    Updated(u32),
    /// The requested quantity was below one, so the line was removed.
    Removed,
    /// No line has that key.
    NotFound,
}

/// Owns the ordered collection of cart lines and their derived totals.
///
/// All operations are synchronous. The engine only consumes already-resolved
/// [`Product`] values; it never fetches from the catalog itself.
pub struct CartEngine {
    id: Uuid,
    lines: Vec<CartLine>,
    totals: CartTotals,
    tax: TaxPolicy,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for CartEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEngine")
            .field("id", &self.id)
            .field("lines", &self.lines.len())
            .field("totals", &self.totals)
            .finish_non_exhaustive()
    }
}

impl CartEngine {
    /// Create an empty cart.
    #[must_use]
    pub fn new(tax: TaxPolicy, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_lines(Uuid::new_v4(), Vec::new(), tax, notifier)
    }

    pub(crate) fn with_lines(
        id: Uuid,
        lines: Vec<CartLine>,
        tax: TaxPolicy,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let totals = compute_totals(&lines, &tax);
        Self {
            id,
            lines,
            totals,
            tax,
            notifier,
        }
    }

    /// Identifier of this cart, stable across snapshots.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Add one unit of `product` with no note and no variant.
    pub fn add_item(&mut self, product: &Product) -> Option<LineKey> {
        self.add_item_with(product, AddItemOptions::default())
    }

    /// Add `product` to the cart, merging into an existing line when the
    /// product, variant and note all match.
    ///
    /// Returns the key of the line that was created or incremented. Malformed
    /// products are logged and ignored, returning `None`; the cart is left
    /// untouched.
    pub fn add_item_with(&mut self, product: &Product, options: AddItemOptions) -> Option<LineKey> {
        if let Err(e) = product.validate() {
            tracing::warn!(product_id = %product.id, error = %e, "Ignoring invalid product");
            return None;
        }

        let resolved = product.variants.as_ref().map_or_else(
            || options.variant.is_empty(),
            |variants| variants.admits(&options.variant),
        );
        if !resolved {
            tracing::warn!(
                product_id = %product.id,
                variant = %options.variant,
                "Ignoring incomplete or unoffered variant"
            );
            return None;
        }

        let quantity = options.quantity.max(1);
        let key = LineKey::new(product.id.clone(), options.variant, &options.note);

        let merged = if let Some(line) = self.lines.iter_mut().find(|l| l.key == key) {
            line.quantity = line.quantity.saturating_add(quantity);
            tracing::debug!(line = %key, quantity = line.quantity, "Merged into existing line");
            true
        } else {
            self.lines.push(CartLine {
                key: key.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
                badge: options.badge_override.or(product.badge),
                added_at: Utc::now(),
            });
            tracing::debug!(line = %key, quantity, "Added new line");
            false
        };

        self.recompute();
        self.notifier.notify(&EngineEvent::ItemAdded {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            merged,
        });

        Some(key)
    }

    /// Set a line's quantity from the stepper control.
    ///
    /// Quantities below one remove the line.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: i64) -> QuantityChange {
        if quantity < 1 {
            tracing::debug!(line = %key, quantity, "Quantity below one, removing line");
            return if self.remove_item(key) {
                QuantityChange::Removed
            } else {
                QuantityChange::NotFound
            };
        }

        let Some(line) = self.lines.iter_mut().find(|l| &l.key == key) else {
            tracing::debug!(line = %key, "Quantity update for unknown line");
            return QuantityChange::NotFound;
        };

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        line.quantity = quantity;

        self.recompute();
        self.notifier.notify(&EngineEvent::QuantityChanged {
            line: key.clone(),
            quantity,
        });

        QuantityChange::Updated(quantity)
    }

    /// Remove a line. Removing a key that is not present is a no-op.
    ///
    /// Returns `true` if a line was removed.
    pub fn remove_item(&mut self, key: &LineKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.key != key);
        if self.lines.len() == before {
            return false;
        }

        self.recompute();
        self.notifier
            .notify(&EngineEvent::ItemRemoved { line: key.clone() });
        true
    }

    /// Empty the cart, e.g. after checkout or an explicit cancel.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.recompute();
        self.notifier.notify(&EngineEvent::CartCleared);
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line by key.
    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.key == key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub const fn item_count(&self) -> u32 {
        self.totals.item_count
    }

    /// Totals as of the last mutation.
    #[must_use]
    pub const fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// Re-derive totals from the current lines without modifying the cart.
    #[must_use]
    pub fn compute_totals(&self) -> CartTotals {
        compute_totals(&self.lines, &self.tax)
    }

    #[must_use]
    pub const fn tax_policy(&self) -> &TaxPolicy {
        &self.tax
    }

    fn recompute(&mut self) {
        self.totals = compute_totals(&self.lines, &self.tax);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use pineapple_pos_core::{MAX_PRICE, VariantOptions};

    use super::*;
    use crate::notify::{BroadcastNotifier, NoopNotifier};

    fn cart() -> CartEngine {
        CartEngine::new(TaxPolicy::EXEMPT, Arc::new(NoopNotifier))
    }

    fn cola() -> Product {
        Product::new("p1", "Cola", "drinks", Decimal::new(250, 2))
    }

    #[test]
    fn test_add_creates_single_line() {
        let mut cart = cart();
        let key = cart.add_item(&cola()).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(&key).unwrap().quantity(), 1);
    }

    #[test]
    fn test_identical_add_merges() {
        let mut cart = cart();
        cart.add_item_with(&cola(), AddItemOptions::default().quantity(2));
        let key = cart
            .add_item_with(&cola(), AddItemOptions::default().quantity(1))
            .unwrap();

        assert_eq!(cart.lines().len(), 1);
        let line = cart.line(&key).unwrap();
        assert_eq!(line.quantity(), 3);
        assert_eq!(line.subtotal(), Decimal::new(750, 2));
        assert_eq!(cart.totals().subtotal, Decimal::new(750, 2));
    }

    #[test]
    fn test_different_note_creates_distinct_line() {
        let mut cart = cart();
        cart.add_item(&cola());
        cart.add_item_with(&cola(), AddItemOptions::default().note("no ice"));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_different_variant_creates_distinct_line() {
        let shirt = Product::new("t1", "Tee", "apparel", Decimal::TEN).with_variants(
            VariantOptions {
                sizes: vec!["S".to_string(), "L".to_string()],
                ..VariantOptions::default()
            },
        );
        let small = VariantSelection {
            size: Some("S".to_string()),
            ..VariantSelection::default()
        };
        let large = VariantSelection {
            size: Some("L".to_string()),
            ..VariantSelection::default()
        };

        let mut cart = cart();
        cart.add_item_with(&shirt, AddItemOptions::default().variant(small.clone()));
        cart.add_item_with(&shirt, AddItemOptions::default().variant(large));
        cart.add_item_with(&shirt, AddItemOptions::default().variant(small));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity(), 2);
    }

    #[test]
    fn test_unoffered_variant_is_ignored() {
        let shirt = Product::new("t1", "Tee", "apparel", Decimal::TEN).with_variants(
            VariantOptions {
                sizes: vec!["S".to_string()],
                ..VariantOptions::default()
            },
        );
        let xl = VariantSelection {
            size: Some("XL".to_string()),
            ..VariantSelection::default()
        };

        let mut cart = cart();
        assert!(
            cart.add_item_with(&shirt, AddItemOptions::default().variant(xl))
                .is_none()
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unresolved_variant_is_ignored() {
        let tee = Product::new("t1", "Tee", "apparel", Decimal::TEN).with_variants(
            VariantOptions {
                colors: vec!["black".to_string(), "white".to_string()],
                sizes: vec!["m".to_string(), "l".to_string()],
                ..VariantOptions::default()
            },
        );
        let color_only = VariantSelection {
            color: Some("black".to_string()),
            ..VariantSelection::default()
        };

        let mut cart = cart();
        assert!(cart.add_item(&tee).is_none());
        assert!(
            cart.add_item_with(&tee, AddItemOptions::default().variant(color_only))
                .is_none()
        );
        assert!(cart.is_empty());

        let key = cart
            .add_item_with(
                &tee,
                AddItemOptions::default().variant(VariantSelection {
                    color: Some("white".to_string()),
                    size: Some("l".to_string()),
                    flavor: None,
                }),
            )
            .unwrap();
        assert_eq!(cart.line(&key).unwrap().quantity(), 1);
    }

    #[test]
    fn test_variant_on_plain_product_is_ignored() {
        let cola = Product::new("p1", "Cola", "drinks", Decimal::ONE);
        let large = VariantSelection {
            size: Some("L".to_string()),
            ..VariantSelection::default()
        };

        let mut cart = cart();
        assert!(
            cart.add_item_with(&cola, AddItemOptions::default().variant(large))
                .is_none()
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_oversized_price_never_reaches_cart() {
        let mut cart = cart();
        assert!(
            cart.add_item(&Product::new("p1", "Big", "misc", Decimal::MAX))
                .is_none()
        );
        assert!(cart.is_empty());

        let key = cart
            .add_item(&Product::new("p2", "Gold Bar", "misc", MAX_PRICE))
            .unwrap();
        assert_eq!(cart.update_quantity(&key, 2), QuantityChange::Updated(2));
        assert_eq!(
            cart.update_quantity(&key, i64::MAX),
            QuantityChange::Updated(u32::MAX)
        );
        assert_eq!(
            cart.totals().subtotal,
            MAX_PRICE * Decimal::from(u32::MAX)
        );
    }

    #[test]
    fn test_zero_quantity_add_is_clamped() {
        let mut cart = cart();
        cart.add_item_with(&cola(), AddItemOptions::default().quantity(0));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_invalid_product_is_noop() {
        let mut cart = cart();
        let nameless = Product::new("p1", "", "drinks", Decimal::ONE);
        let negative = Product::new("p2", "Refund", "drinks", Decimal::new(-5, 0));

        assert!(cart.add_item(&nameless).is_none());
        assert!(cart.add_item(&negative).is_none());
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), &CartTotals::default());
    }

    #[test]
    fn test_unit_price_frozen_while_line_exists() {
        let mut cart = cart();
        let mut product = cola();
        cart.add_item(&product);

        product.price = Decimal::new(300, 2);
        let key = cart.add_item(&product).unwrap();

        let line = cart.line(&key).unwrap();
        assert_eq!(line.unit_price(), Decimal::new(250, 2));
        assert_eq!(line.quantity(), 2);
    }

    #[test]
    fn test_badge_captured_at_add_time() {
        let mut cart = cart();
        let mut product = cola().with_badge(Badge::PercentOff);
        let key = cart.add_item(&product).unwrap();

        product.badge = None;
        cart.add_item(&product);

        assert_eq!(cart.line(&key).unwrap().badge(), Some(Badge::PercentOff));
        assert_eq!(cart.totals().discount, Decimal::new(100, 2));
    }

    #[test]
    fn test_badge_override() {
        let mut cart = cart();
        let key = cart
            .add_item_with(
                &cola(),
                AddItemOptions::default().badge_override(Badge::PercentOff),
            )
            .unwrap();
        assert_eq!(cart.line(&key).unwrap().badge(), Some(Badge::PercentOff));
        assert_eq!(cart.totals().discount, Decimal::new(50, 2));
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = cart();
        let key = cart.add_item(&cola()).unwrap();

        assert_eq!(cart.update_quantity(&key, 4), QuantityChange::Updated(4));
        assert_eq!(cart.totals().subtotal, Decimal::new(1000, 2));
    }

    #[test]
    fn test_update_quantity_below_one_removes() {
        let mut cart = cart();
        let key = cart.add_item(&cola()).unwrap();

        assert_eq!(cart.update_quantity(&key, 0), QuantityChange::Removed);
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity(&key, -3), QuantityChange::NotFound);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = cart();
        let key = cart.add_item(&cola()).unwrap();

        assert!(cart.remove_item(&key));
        assert!(!cart.remove_item(&key));
        assert_eq!(cart.totals(), &CartTotals::default());
    }

    #[test]
    fn test_readd_after_remove_uses_current_price() {
        let mut cart = cart();
        let mut product = cola();
        let key = cart.add_item(&product).unwrap();
        cart.remove_item(&key);

        product.price = Decimal::new(300, 2);
        let key = cart.add_item(&product).unwrap();
        assert_eq!(cart.line(&key).unwrap().unit_price(), Decimal::new(300, 2));
    }

    #[test]
    fn test_clear_resets_totals() {
        let mut cart = cart();
        cart.add_item(&cola());
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.totals(), &CartTotals::default());
    }

    #[test]
    fn test_cached_totals_match_recomputation() {
        let mut cart = cart();
        cart.add_item_with(&cola().with_badge(Badge::PercentOff), AddItemOptions::default().quantity(3));
        cart.add_item(&Product::new("p2", "Chips", "snacks", Decimal::new(199, 2)));

        assert_eq!(cart.totals(), &cart.compute_totals());
        assert_eq!(cart.compute_totals(), cart.compute_totals());
    }

    #[test]
    fn test_events_published() {
        let bus = BroadcastNotifier::default();
        let mut rx = bus.subscribe();
        let mut cart = CartEngine::new(TaxPolicy::EXEMPT, Arc::new(bus));

        let key = cart.add_item(&cola()).unwrap();
        cart.add_item(&cola());
        cart.remove_item(&key);

        assert!(matches!(
            rx.try_recv().unwrap(),
            EngineEvent::ItemAdded { merged: false, .. }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            EngineEvent::ItemAdded { merged: true, .. }
        ));
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::ItemRemoved { line: key }
        );
    }
}
