//! Paginated product queries.
//!
//! [`ProductQueryService`] fronts a [`ProductSource`] (the persisted product
//! table, or an in-memory stand-in) and returns one [`QueryPage`] per call.
//! The service is stateless across calls: "load more" concatenation and stale
//! response handling belong to the caller, via [`PageAccumulator`] and
//! [`RequestSequencer`].

mod cache;
mod memory;
mod sequence;

use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use pineapple_pos_core::{CategoryId, Product};

use crate::db::RepositoryError;
use crate::error::QueryError;
use crate::notify::{EngineEvent, Notifier};

pub use cache::PageCache;
pub use memory::{InMemoryProductSource, paginate};
pub use sequence::{PageAccumulator, RequestSequencer, SequenceToken};

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Field to order results by. Ties are always broken by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Name,
    Price,
    Category,
    Id,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "category" => Ok(Self::Category),
            "id" => Ok(Self::Id),
            _ => Err(format!("invalid sort field: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// A paginated query request, serialized as
/// `{page, limit, sortBy, sortOrder, query?, category?}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    /// 1-indexed page number.
    pub page: u32,
    pub limit: u32,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub query: Option<String>,
    /// Exact category match; `all` means no filter.
    #[serde(default)]
    pub category: Option<CategoryId>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            query: None,
            category: None,
        }
    }
}

impl QueryParams {
    /// Check the pagination bounds.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidParams` if `page` is zero or `limit` is zero.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page < 1 {
            return Err(QueryError::InvalidParams("page must be at least 1".to_string()));
        }
        if self.limit < 1 {
            return Err(QueryError::InvalidParams("limit must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// The same filters, positioned at another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Returns `true` if `other` selects the same result set (ignoring the page).
    #[must_use]
    pub fn same_filters(&self, other: &Self) -> bool {
        self.limit == other.limit
            && self.sort_by == other.sort_by
            && self.sort_order == other.sort_order
            && self.query == other.query
            && self.category == other.category
    }

    /// Zero-based row offset of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of results plus pagination metadata.
///
/// Pages are built fresh per query and never mutated afterwards. Serialized
/// as `{products, page, totalPages, hasNextPage, totalCount}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage {
    #[serde(rename = "products")]
    pub items: Vec<Product>,
    pub page: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub total_count: u64,
}

impl QueryPage {
    /// Build a page, deriving the metadata from the total match count.
    #[must_use]
    pub fn new(items: Vec<Product>, params: &QueryParams, total_count: u64) -> Self {
        let limit = u64::from(params.limit.max(1));
        let total_pages = u32::try_from(total_count.div_ceil(limit)).unwrap_or(u32::MAX);
        let has_next_page = u64::from(params.page) * limit < total_count;

        Self {
            items,
            page: params.page,
            total_pages,
            has_next_page,
            total_count,
        }
    }
}

/// Ordering used by every source: the sort field in the requested direction,
/// then id ascending.
#[must_use]
pub fn compare_products(a: &Product, b: &Product, sort_by: SortBy, order: SortOrder) -> Ordering {
    let primary = match sort_by {
        SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortBy::Price => a.price.cmp(&b.price),
        SortBy::Category => a.category.cmp(&b.category),
        SortBy::Id => Ordering::Equal,
    };
    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    let tie_break = match (sort_by, order) {
        (SortBy::Id, SortOrder::Desc) => b.id.cmp(&a.id),
        _ => a.id.cmp(&b.id),
    };
    primary.then(tie_break)
}

/// Backend that can execute a filtered, sorted, paginated product query.
pub trait ProductSource: Send + Sync {
    /// Fetch the page described by `params`. Parameters are already validated.
    fn fetch_page(
        &self,
        params: &QueryParams,
    ) -> impl Future<Output = Result<QueryPage, RepositoryError>> + Send;
}

/// Executes paginated product queries against a [`ProductSource`].
pub struct ProductQueryService<S> {
    source: S,
    cache: Option<PageCache>,
    notifier: Arc<dyn Notifier>,
}

impl<S: ProductSource> ProductQueryService<S> {
    /// Create a service without a page cache.
    #[must_use]
    pub fn new(source: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            cache: None,
            notifier,
        }
    }

    /// Cache pages for `ttl`. A zero TTL disables caching.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = (!ttl.is_zero()).then(|| PageCache::new(ttl));
        self
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Run one paginated query.
    ///
    /// Failures are reported to the notifier as a retryable error state and
    /// returned to the caller; they never touch the cart.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidParams` for out-of-range pagination and
    /// `QueryError::Storage` if the backing store fails.
    #[instrument(skip(self), fields(page = params.page, limit = params.limit))]
    pub async fn get_products_paginated(&self, params: &QueryParams) -> Result<QueryPage, QueryError> {
        let result = self.execute(params).await;

        if let Err(e) = &result {
            tracing::error!(error = %e, "Product query failed");
            self.notifier.notify(&EngineEvent::QueryFailed {
                message: e.user_message(),
                retryable: e.is_retryable(),
            });
        }

        result
    }

    /// Drop cached pages, e.g. after a catalog write.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }

    async fn execute(&self, params: &QueryParams) -> Result<QueryPage, QueryError> {
        params.validate()?;

        if let Some(cache) = &self.cache
            && let Some(page) = cache.get(params).await
        {
            tracing::debug!("Serving page from cache");
            return Ok(page);
        }

        let page = self.source.fetch_page(params).await?;
        tracing::debug!(
            items = page.items.len(),
            total_count = page.total_count,
            has_next_page = page.has_next_page,
            "Fetched page"
        );

        if let Some(cache) = &self.cache {
            cache.insert(params.clone(), page.clone()).await;
        }

        Ok(page)
    }
}
