//! Category taxonomy and derived facet counts.

use serde::{Deserialize, Serialize};

use super::id::CategoryId;

/// Sentinel category key meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// A category in the static taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Display icon reference, opaque to the engine.
    #[serde(default)]
    pub icon: String,
}

impl Category {
    /// Returns `true` if this is the "all" sentinel category.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.id.as_str() == ALL_CATEGORIES
    }
}

/// A category together with how many products it currently holds.
///
/// Facets are derived from a catalog snapshot; they are never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFacet {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub count: usize,
}

impl CategoryFacet {
    /// Build a facet for `category` with the given product count.
    #[must_use]
    pub fn new(category: &Category, count: usize) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            count,
        }
    }
}
