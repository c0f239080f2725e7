//! Cart quoting.
//!
//! # Usage
//!
//! ```bash
//! # Two colas and a bag of chips
//! pos-cli --catalog catalog.yaml cart quote cola:2 chips
//!
//! # Keep adding to a saved cart
//! pos-cli --catalog catalog.yaml cart quote water --snapshot cart.json
//! ```
//!
//! Products with variant choices are added with the first option of each
//! dimension, since there is no customization surface on the command line.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use pineapple_pos_core::{ProductId, VariantOptions};
use pineapple_pos_engine::cart::AddItemOptions;
use pineapple_pos_engine::{
    CartEngine, CartLine, EngineConfig, Resolution, TracingNotifier, VariantResolver,
};

use super::{CatalogBackend, CommandError};

/// Parse `product_id[:quantity]`.
fn parse_item(raw: &str) -> Result<(ProductId, u32), CommandError> {
    let (id, quantity) = match raw.rsplit_once(':') {
        Some((id, qty)) => {
            let qty: u32 = qty
                .parse()
                .map_err(|_| CommandError::InvalidArgument(format!("bad quantity in '{raw}'")))?;
            (id, qty)
        }
        None => (raw, 1),
    };

    if id.trim().is_empty() || quantity == 0 {
        return Err(CommandError::InvalidArgument(format!(
            "expected product_id[:quantity], got '{raw}'"
        )));
    }
    Ok((ProductId::new(id.trim()), quantity))
}

/// Build a cart from `items` and log its lines and totals.
pub async fn quote(
    backend: &CatalogBackend,
    items: &[String],
    snapshot: Option<&Path>,
    config: &EngineConfig,
) -> Result<(), CommandError> {
    let items = items
        .iter()
        .map(|raw| parse_item(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let notifier = Arc::new(TracingNotifier);
    let mut cart = match snapshot {
        Some(path) if path.exists() => {
            let json = read(path).await?;
            CartEngine::restore_or_default(&json, config.tax, notifier)
        }
        _ => CartEngine::new(config.tax, notifier),
    };

    add_items(backend, &items, &mut cart).await?;

    for line in cart.lines() {
        info!(
            "{:<40} {:>4} x {:>9} = {:>9}",
            line.key().to_string(),
            line.quantity(),
            line.unit_price(),
            line.subtotal()
        );
    }

    let totals = cart.totals();
    info!(
        items = totals.item_count,
        subtotal = %totals.subtotal,
        discount = %totals.discount,
        tax = %totals.tax,
        total = %totals.total,
        "Cart totals"
    );

    if let Some(path) = snapshot {
        let json = cart.snapshot().to_json()?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| CommandError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), "Cart snapshot saved");
    }

    Ok(())
}

/// Add each `(product, quantity)` pair through the variant resolver.
async fn add_items(
    backend: &CatalogBackend,
    items: &[(ProductId, u32)],
    cart: &mut CartEngine,
) -> Result<(), CommandError> {
    for (id, quantity) in items {
        let quantity = *quantity;
        let Some(product) = backend.product(id).await? else {
            warn!(product_id = %id, "Unknown product, skipping");
            continue;
        };

        match VariantResolver::select(&product, cart) {
            Resolution::Added(Some(key)) if quantity > 1 => {
                let current = cart.line(&key).map_or(0, CartLine::quantity);
                cart.update_quantity(&key, i64::from(current) + i64::from(quantity) - 1);
            }
            Resolution::Added(_) => {}
            Resolution::AwaitCustomization(customization) => {
                let variant = customization
                    .product()
                    .variants
                    .as_ref()
                    .map(VariantOptions::default_selection)
                    .unwrap_or_default();
                info!(product_id = %id, %variant, "Using first option of each variant");
                customization.complete(
                    cart,
                    AddItemOptions::default().quantity(quantity).variant(variant),
                );
            }
        }
    }
    Ok(())
}

async fn read(path: &Path) -> Result<String, CommandError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pineapple_pos_core::{Category, Product, VariantSelection};
    use pineapple_pos_engine::{CatalogStore, TaxPolicy};
    use rust_decimal::Decimal;

    use super::*;

    fn backend() -> CatalogBackend {
        let tee = Product::new("tee", "Logo Tee", "merch", Decimal::TEN).with_variants(
            VariantOptions {
                colors: vec!["black".to_string(), "white".to_string()],
                sizes: vec!["m".to_string(), "l".to_string()],
                ..VariantOptions::default()
            },
        );
        let cola = Product::new("cola", "Cola", "drinks", Decimal::ONE);
        let categories = vec![Category {
            id: "merch".into(),
            name: "Merch".to_string(),
            icon: String::new(),
        }];
        CatalogBackend::Memory(CatalogStore::new(categories, vec![tee, cola]))
    }

    #[tokio::test]
    async fn test_customizable_product_gets_first_options() {
        let mut cart = CartEngine::new(TaxPolicy::EXEMPT, Arc::new(TracingNotifier));
        let items = vec![
            (ProductId::new("tee"), 2),
            (ProductId::new("cola"), 3),
            (ProductId::new("missing"), 1),
        ];

        add_items(&backend(), &items, &mut cart).await.unwrap();

        assert_eq!(cart.lines().len(), 2);
        let tee = &cart.lines()[0];
        assert_eq!(
            tee.selected_variant(),
            &VariantSelection {
                color: Some("black".to_string()),
                size: Some("m".to_string()),
                flavor: None,
            }
        );
        assert_eq!(tee.quantity(), 2);
        assert_eq!(cart.lines()[1].quantity(), 3);
    }

    #[test]
    fn test_parse_item_with_quantity() {
        let (id, qty) = parse_item("cola:3").unwrap();
        assert_eq!(id.as_str(), "cola");
        assert_eq!(qty, 3);
    }

    #[test]
    fn test_parse_item_defaults_to_one() {
        let (id, qty) = parse_item("chips").unwrap();
        assert_eq!(id.as_str(), "chips");
        assert_eq!(qty, 1);
    }

    #[test]
    fn test_parse_item_rejects_bad_input() {
        assert!(parse_item("cola:zero").is_err());
        assert!(parse_item("cola:0").is_err());
        assert!(parse_item(":2").is_err());
    }
}
