//! In-memory catalog for small or offline deployments.
//!
//! `CatalogStore` holds the category taxonomy and a full product snapshot.
//! It is the alternative to [`crate::query::ProductQueryService`] when the
//! catalog is small enough that pagination is unnecessary; the two are never
//! composed.

mod search;

use serde::Deserialize;

use pineapple_pos_core::{ALL_CATEGORIES, Category, CategoryFacet, CategoryId, Product, ProductId};

pub use search::{SearchTerm, is_category_filter, matches_filters};

/// On-disk catalog layout (YAML or JSON).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Read-only facade over the category taxonomy and a product snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    categories: Vec<Category>,
    products: Vec<Product>,
    facets: Vec<CategoryFacet>,
}

impl From<CatalogFile> for CatalogStore {
    fn from(file: CatalogFile) -> Self {
        Self::new(file.categories, file.products)
    }
}

impl CatalogStore {
    /// Build a store. Facet counts are derived immediately.
    #[must_use]
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Self {
        let mut store = Self {
            categories,
            products: Vec::new(),
            facets: Vec::new(),
        };
        store.replace_snapshot(products);
        store
    }

    /// Swap in a new product snapshot and recompute facet counts.
    pub fn replace_snapshot(&mut self, products: Vec<Product>) {
        self.products = products;
        self.facets = self.compute_facets();
        tracing::debug!(
            products = self.products.len(),
            categories = self.categories.len(),
            "Catalog snapshot replaced"
        );
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category facets, led by the `all` facet.
    #[must_use]
    pub fn facets(&self) -> &[CategoryFacet] {
        &self.facets
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Every product in a category, unfiltered and in snapshot order.
    ///
    /// The `all` sentinel returns the whole snapshot.
    #[must_use]
    pub fn items_by_category(&self, category: &CategoryId) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| matches_filters(p, Some(category), None))
            .collect()
    }

    /// Case-insensitive substring search over name, brand and category.
    ///
    /// A blank query returns the whole snapshot.
    #[must_use]
    pub fn search_items(&self, query: &str) -> Vec<&Product> {
        let term = SearchTerm::parse(query);
        self.products
            .iter()
            .filter(|p| matches_filters(p, None, term.as_ref()))
            .collect()
    }

    fn compute_facets(&self) -> Vec<CategoryFacet> {
        let all = self
            .categories
            .iter()
            .find(|c| c.is_all())
            .cloned()
            .unwrap_or_else(|| Category {
                id: CategoryId::new(ALL_CATEGORIES),
                name: "All".to_string(),
                icon: String::new(),
            });

        let mut facets = Vec::with_capacity(self.categories.len() + 1);
        facets.push(CategoryFacet::new(&all, self.products.len()));
        facets.extend(
            self.categories
                .iter()
                .filter(|c| !c.is_all())
                .map(|c| {
                    let count = self.products.iter().filter(|p| p.category == c.id).count();
                    CategoryFacet::new(c, count)
                }),
        );
        facets
    }
}
