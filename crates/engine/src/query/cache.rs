//! Short-lived page cache in front of the product source.

use std::time::Duration;

use moka::future::Cache;

use super::{QueryPage, QueryParams};

/// Maximum number of cached pages.
const MAX_CACHED_PAGES: u64 = 1_000;

/// Pages keyed by the full request, including the page number.
#[derive(Clone)]
pub struct PageCache {
    pages: Cache<QueryParams, QueryPage>,
}

impl std::fmt::Debug for PageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("entries", &self.pages.entry_count())
            .finish()
    }
}

impl PageCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            pages: Cache::builder()
                .max_capacity(MAX_CACHED_PAGES)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, params: &QueryParams) -> Option<QueryPage> {
        self.pages.get(params).await
    }

    pub async fn insert(&self, params: QueryParams, page: QueryPage) {
        self.pages.insert(params, page).await;
    }

    pub fn invalidate_all(&self) {
        self.pages.invalidate_all();
    }
}
