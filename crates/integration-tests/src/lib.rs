//! Integration tests for Pineapple POS.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pineapple-pos-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart merging, pricing, variant customization and persistence
//! - `catalog_queries` - Pagination, filtering, incremental loading and failures
//! - `stale_responses` - Request sequencing under rapid filter changes
//!
//! This crate holds the shared fixtures.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;

use pineapple_pos_core::{Badge, Category, Product, VariantOptions};
use pineapple_pos_engine::db::RepositoryError;
use pineapple_pos_engine::query::paginate;
use pineapple_pos_engine::{
    CatalogStore, EngineEvent, Notifier, ProductSource, QueryPage, QueryParams,
};

/// Build a price from a whole number of cents.
#[must_use]
pub fn cents(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}

/// A small shop: five drinks, two snacks, and a customizable tee.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new("d1", "Cola", "drinks", cents(250)).with_brand("Fizz Co"),
        Product::new("d2", "Lemonade", "drinks", cents(300)),
        Product::new("d3", "Iced Tea", "drinks", cents(275)).with_badge(Badge::PercentOff),
        Product::new("d4", "Sparkling Water", "drinks", cents(150)),
        Product::new("d5", "Cold Brew", "drinks", cents(450)).with_badge(Badge::Limited),
        Product::new("s1", "Crisps", "snacks", cents(125)),
        Product::new("s2", "Cola Gummies", "snacks", cents(199)),
        Product::new("m1", "Logo Tee", "merch", cents(2000)).with_variants(VariantOptions {
            colors: vec!["black".to_string(), "white".to_string()],
            sizes: vec!["m".to_string(), "l".to_string()],
            flavors: Vec::new(),
        }),
    ]
}

#[must_use]
pub fn sample_categories() -> Vec<Category> {
    ["all", "drinks", "snacks", "merch"]
        .into_iter()
        .map(|id| Category {
            id: id.into(),
            name: id.to_uppercase(),
            icon: String::new(),
        })
        .collect()
}

#[must_use]
pub fn sample_store() -> CatalogStore {
    CatalogStore::new(sample_categories(), sample_products())
}

/// Notifier that remembers every event it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &EngineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Source whose storage is always unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreachableSource;

impl ProductSource for UnreachableSource {
    async fn fetch_page(&self, _params: &QueryParams) -> Result<QueryPage, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }
}

/// In-memory source that answers queries for one category more slowly than
/// the rest.
#[derive(Debug, Clone)]
pub struct SlowCategorySource {
    products: Vec<Product>,
    slow_category: String,
    delay: Duration,
}

impl SlowCategorySource {
    #[must_use]
    pub fn new(products: Vec<Product>, slow_category: &str, delay: Duration) -> Self {
        Self {
            products,
            slow_category: slow_category.to_string(),
            delay,
        }
    }
}

impl ProductSource for SlowCategorySource {
    async fn fetch_page(&self, params: &QueryParams) -> Result<QueryPage, RepositoryError> {
        let slow = params
            .category
            .as_ref()
            .is_some_and(|c| c.as_str() == self.slow_category);
        if slow {
            tokio::time::sleep(self.delay).await;
        }
        Ok(paginate(&self.products, params))
    }
}
