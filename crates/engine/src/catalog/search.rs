//! Substring matching shared by the in-memory catalog and query service.

use pineapple_pos_core::{ALL_CATEGORIES, CategoryId, Product};

/// A normalized, case-insensitive search needle.
///
/// Blank input normalizes to `None`, meaning "no search filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    #[must_use]
    pub fn parse(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A product matches if its name, brand or category contains the term.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let contains = |field: &str| field.to_lowercase().contains(&self.0);

        contains(&product.name)
            || product.brand.as_deref().is_some_and(contains)
            || contains(product.category.as_str())
    }
}

/// Returns `true` if `category` restricts results (present and not `all`).
#[must_use]
pub fn is_category_filter(category: Option<&CategoryId>) -> bool {
    category.is_some_and(|c| c.as_str() != ALL_CATEGORIES && !c.is_blank())
}

/// Combined category and search predicate.
#[must_use]
pub fn matches_filters(
    product: &Product,
    category: Option<&CategoryId>,
    term: Option<&SearchTerm>,
) -> bool {
    let category_ok = !is_category_filter(category) || category == Some(&product.category);
    category_ok && term.is_none_or(|t| t.matches(product))
}
