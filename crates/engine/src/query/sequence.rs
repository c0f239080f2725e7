//! Stale-response detection and client-side "load more" accumulation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use pineapple_pos_core::{Product, ProductId};

use super::{QueryPage, QueryParams};

/// Monotonically increasing tag attached to each issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceToken(u64);

impl SequenceToken {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Issues sequence tokens and decides which responses are still wanted.
///
/// Last-issued-wins: only the response to the most recently issued request is
/// accepted. In-flight requests are never cancelled; their results are simply
/// dropped when they arrive stale.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Tag a new request. Supersedes every earlier token.
    pub fn issue(&self) -> SequenceToken {
        SequenceToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Returns `true` if no request has been issued after `token`.
    #[must_use]
    pub fn is_current(&self, token: SequenceToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }

    /// Pass a response through only if it is still current.
    pub fn accept<T>(&self, token: SequenceToken, response: T) -> Option<T> {
        if self.is_current(token) {
            Some(response)
        } else {
            tracing::debug!(
                token = token.0,
                latest = self.latest.load(Ordering::Acquire),
                "Discarding stale response"
            );
            None
        }
    }
}

/// Concatenates pages for an incremental "load more" list.
///
/// Rows are deduplicated by id, since a catalog write between two page
/// fetches can shift a row onto the next page. Changing any filter discards
/// everything accumulated so far.
#[derive(Debug, Default)]
pub struct PageAccumulator {
    params: Option<QueryParams>,
    items: Vec<Product>,
    seen: HashSet<ProductId>,
    last_page: u32,
    has_next_page: bool,
    total_pages: u32,
}

impl PageAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a page fetched with `params`.
    ///
    /// Page 1 or a filter change starts over. Returns the number of rows
    /// actually appended.
    pub fn apply(&mut self, params: &QueryParams, page: QueryPage) -> usize {
        let restart = page.page <= 1
            || self
                .params
                .as_ref()
                .is_none_or(|current| !current.same_filters(params));
        if restart {
            self.reset();
        }

        self.params = Some(params.clone());
        self.last_page = page.page;
        self.has_next_page = page.has_next_page;
        self.total_pages = page.total_pages;

        let before = self.items.len();
        for product in page.items {
            if self.seen.insert(product.id.clone()) {
                self.items.push(product);
            } else {
                tracing::debug!(product_id = %product.id, "Skipping duplicate row");
            }
        }
        self.items.len() - before
    }

    /// Forget all accumulated rows.
    pub fn reset(&mut self) {
        self.params = None;
        self.items.clear();
        self.seen.clear();
        self.last_page = 0;
        self.has_next_page = false;
        self.total_pages = 0;
    }

    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Parameters for the next page, if there is one.
    #[must_use]
    pub fn next_params(&self) -> Option<QueryParams> {
        let params = self.params.as_ref()?;
        self.has_next_page
            .then(|| params.with_page(self.last_page.saturating_add(1)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str) -> Product {
        Product::new(id, id.to_uppercase(), "drinks", Decimal::ONE)
    }

    fn page(n: u32, ids: &[&str], has_next_page: bool) -> QueryPage {
        QueryPage {
            items: ids.iter().map(|id| product(id)).collect(),
            page: n,
            total_pages: 3,
            has_next_page,
            total_count: 5,
        }
    }

    #[test]
    fn test_last_issued_wins() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();
        assert!(first < second);

        assert_eq!(sequencer.accept(second, "second"), Some("second"));
        assert_eq!(sequencer.accept(first, "first"), None);
    }

    #[test]
    fn test_earlier_response_arriving_first_is_still_stale() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let _second = sequencer.issue();
        assert!(sequencer.accept(first, ()).is_none());
    }

    #[test]
    fn test_accumulator_dedupes_and_tracks_next_page() {
        let params = QueryParams {
            limit: 2,
            ..QueryParams::default()
        };
        let mut acc = PageAccumulator::new();

        assert_eq!(acc.apply(&params, page(1, &["a", "b"], true)), 2);
        assert_eq!(acc.next_params().unwrap().page, 2);

        // "b" shifted onto page 2 after a concurrent insert
        assert_eq!(acc.apply(&params.with_page(2), page(2, &["b", "c"], true)), 1);
        assert_eq!(acc.items().len(), 3);

        assert_eq!(acc.apply(&params.with_page(3), page(3, &["d"], false)), 1);
        assert!(!acc.has_next_page());
        assert!(acc.next_params().is_none());
    }

    #[test]
    fn test_filter_change_discards_previous_pages() {
        let params = QueryParams {
            limit: 2,
            ..QueryParams::default()
        };
        let mut acc = PageAccumulator::new();
        acc.apply(&params, page(1, &["a", "b"], true));

        let searched = QueryParams {
            query: Some("c".to_string()),
            ..params.with_page(2)
        };
        acc.apply(&searched, page(2, &["c"], false));

        let ids: Vec<&str> = acc.items().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["c"]);
    }
}
