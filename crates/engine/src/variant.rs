//! Direct-add vs. customization decision for a product selection.
//!
//! Each product tap starts a fresh evaluation:
//!
//! ```text
//! Idle -> EvaluatingVariants -> DirectAdd           (cart mutated)
//!                            -> AwaitCustomization  (complete -> cart mutated)
//!                                                   (cancel   -> Idle, no mutation)
//! ```
//!
//! Nothing is remembered between evaluations; a pending customization is a
//! value owned by the caller, not state inside the resolver.

use pineapple_pos_core::Product;

use crate::cart::{AddItemOptions, CartEngine, LineKey};

/// Where a product selection currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    /// Transient while [`VariantResolver::evaluate`] inspects the product.
    EvaluatingVariants,
    DirectAdd,
    AwaitCustomization,
}

/// Result of selecting a product.
#[derive(Debug)]
pub enum Resolution {
    /// The product had no variant choices and was added straight to the cart.
    /// `None` if the cart rejected the product as malformed.
    Added(Option<LineKey>),
    /// The operator must choose variants (and optionally a note) first.
    AwaitCustomization(Customization),
}

impl Resolution {
    /// The resolver state this resolution corresponds to.
    #[must_use]
    pub const fn state(&self) -> ResolverState {
        match self {
            Self::Added(_) => ResolverState::DirectAdd,
            Self::AwaitCustomization(_) => ResolverState::AwaitCustomization,
        }
    }
}

/// A pending customization handed to the external customization surface.
///
/// Consumed by either [`Customization::complete`] or [`Customization::cancel`].
#[derive(Debug, Clone)]
#[must_use = "a customization must be completed or cancelled"]
pub struct Customization {
    product: Product,
}

impl Customization {
    /// The product being customized.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Add the product with the chosen variant and note.
    ///
    /// Returns `None` and leaves the cart alone unless every offered
    /// dimension has a valid choice.
    pub fn complete(self, cart: &mut CartEngine, options: AddItemOptions) -> Option<LineKey> {
        tracing::debug!(
            product_id = %self.product.id,
            variant = %options.variant,
            "Customization completed"
        );
        cart.add_item_with(&self.product, options)
    }

    /// Abandon the customization without touching the cart.
    pub fn cancel(self) -> ResolverState {
        tracing::debug!(product_id = %self.product.id, "Customization cancelled");
        ResolverState::Idle
    }
}

/// Decides whether a product can be added directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariantResolver;

impl VariantResolver {
    /// Evaluate a product without side effects.
    ///
    /// `DirectAdd` iff every variant dimension is absent or empty.
    #[must_use]
    pub fn evaluate(product: &Product) -> ResolverState {
        if product.has_variants() {
            ResolverState::AwaitCustomization
        } else {
            ResolverState::DirectAdd
        }
    }

    /// Handle a product selection, adding it to `cart` when no customization
    /// is needed.
    pub fn select(product: &Product, cart: &mut CartEngine) -> Resolution {
        let state = Self::evaluate(product);
        tracing::debug!(product_id = %product.id, ?state, "Product selected");

        match state {
            ResolverState::DirectAdd => Resolution::Added(cart.add_item(product)),
            _ => Resolution::AwaitCustomization(Customization {
                product: product.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use pineapple_pos_core::{VariantOptions, VariantSelection};

    use super::*;
    use crate::cart::TaxPolicy;
    use crate::notify::NoopNotifier;

    fn cart() -> CartEngine {
        CartEngine::new(TaxPolicy::EXEMPT, Arc::new(NoopNotifier))
    }

    fn latte() -> Product {
        Product::new("c1", "Latte", "coffee", Decimal::new(450, 2)).with_variants(VariantOptions {
            sizes: vec!["S".to_string(), "M".to_string()],
            flavors: vec!["vanilla".to_string()],
            ..VariantOptions::default()
        })
    }

    #[test]
    fn test_no_variants_adds_directly() {
        let mut cart = cart();
        let product = Product::new("p1", "Cola", "drinks", Decimal::ONE);

        let resolution = VariantResolver::select(&product, &mut cart);

        assert_eq!(resolution.state(), ResolverState::DirectAdd);
        assert!(matches!(resolution, Resolution::Added(Some(_))));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_empty_dimensions_add_directly() {
        let product = Product::new("p1", "Cola", "drinks", Decimal::ONE)
            .with_variants(VariantOptions::default());
        assert_eq!(VariantResolver::evaluate(&product), ResolverState::DirectAdd);
    }

    #[test]
    fn test_any_variant_dimension_awaits_customization() {
        for options in [
            VariantOptions {
                colors: vec!["red".to_string()],
                ..VariantOptions::default()
            },
            VariantOptions {
                sizes: vec!["S".to_string()],
                ..VariantOptions::default()
            },
            VariantOptions {
                flavors: vec!["mint".to_string()],
                ..VariantOptions::default()
            },
        ] {
            let product = Product::new("p1", "Thing", "misc", Decimal::ONE).with_variants(options);
            let mut cart = cart();
            let resolution = VariantResolver::select(&product, &mut cart);
            assert_eq!(resolution.state(), ResolverState::AwaitCustomization);
            assert!(cart.is_empty());
        }
    }

    #[test]
    fn test_complete_customization_adds_line() {
        let mut cart = cart();
        let Resolution::AwaitCustomization(pending) = VariantResolver::select(&latte(), &mut cart)
        else {
            panic!("expected customization");
        };

        let selection = VariantSelection {
            size: Some("M".to_string()),
            flavor: Some("vanilla".to_string()),
            ..VariantSelection::default()
        };
        let key = pending
            .complete(
                &mut cart,
                AddItemOptions::default().variant(selection.clone()).note("oat milk"),
            )
            .unwrap();

        let line = cart.line(&key).unwrap();
        assert_eq!(line.selected_variant(), &selection);
        assert_eq!(line.note(), "oat milk");
    }

    #[test]
    fn test_complete_without_choice_adds_nothing() {
        let mut cart = cart();
        let Resolution::AwaitCustomization(pending) = VariantResolver::select(&latte(), &mut cart)
        else {
            panic!("expected customization");
        };

        assert!(pending.complete(&mut cart, AddItemOptions::default()).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cancel_returns_to_idle_without_mutation() {
        let mut cart = cart();
        let Resolution::AwaitCustomization(pending) = VariantResolver::select(&latte(), &mut cart)
        else {
            panic!("expected customization");
        };

        assert_eq!(pending.cancel(), ResolverState::Idle);
        assert!(cart.is_empty());
    }
}
