//! In-memory product source.

use std::sync::RwLock;

use pineapple_pos_core::{Product, ProductId};

use super::{ProductSource, QueryPage, QueryParams, compare_products};
use crate::catalog::{SearchTerm, matches_filters};
use crate::db::RepositoryError;

/// Filter, sort and slice a product list into one page.
#[must_use]
pub fn paginate(products: &[Product], params: &QueryParams) -> QueryPage {
    let term = params.query.as_deref().and_then(SearchTerm::parse);

    let mut matching: Vec<&Product> = products
        .iter()
        .filter(|p| matches_filters(p, params.category.as_ref(), term.as_ref()))
        .collect();
    matching.sort_by(|a, b| compare_products(a, b, params.sort_by, params.sort_order));

    let total_count = matching.len() as u64;
    let offset = usize::try_from(params.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(params.limit).unwrap_or(usize::MAX);
    let items = matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    QueryPage::new(items, params, total_count)
}

/// A product table held in memory.
///
/// Useful for tests and for deployments that still want the paginated
/// interface over a small catalog. Writes are visible to the next query.
#[derive(Debug, Default)]
pub struct InMemoryProductSource {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductSource {
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    /// Insert a product, replacing any existing product with the same id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the lock is poisoned.
    pub fn upsert(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| RepositoryError::DataCorruption("Lock poisoned".to_string()))?;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Ok(())
    }

    /// Remove a product by id. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the lock is poisoned.
    pub fn remove(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| RepositoryError::DataCorruption("Lock poisoned".to_string()))?;
        let before = products.len();
        products.retain(|p| &p.id != id);
        Ok(products.len() != before)
    }
}

impl ProductSource for InMemoryProductSource {
    async fn fetch_page(&self, params: &QueryParams) -> Result<QueryPage, RepositoryError> {
        let products = self
            .products
            .read()
            .map_err(|_| RepositoryError::DataCorruption("Lock poisoned".to_string()))?;
        Ok(paginate(&products, params))
    }
}
