//! Catalog queries through `ProductQueryService` and `CatalogStore`.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Arc;

use pineapple_pos_core::{CategoryId, Product};
use pineapple_pos_engine::{
    EngineEvent, InMemoryProductSource, NoopNotifier, PageAccumulator, ProductQueryService,
    QueryError, QueryParams, SortBy, SortOrder,
};
use pineapple_pos_integration_tests::{
    RecordingNotifier, UnreachableSource, cents, sample_products, sample_store,
};

fn service() -> ProductQueryService<InMemoryProductSource> {
    ProductQueryService::new(
        InMemoryProductSource::new(sample_products()),
        Arc::new(NoopNotifier),
    )
}

fn drinks(limit: u32) -> QueryParams {
    QueryParams {
        limit,
        category: Some(CategoryId::from("drinks")),
        ..QueryParams::default()
    }
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_five_drinks_two_per_page() {
    let service = service();

    let first = service.get_products_paginated(&drinks(2)).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert!(first.has_next_page);
    assert_eq!(first.total_pages, 3);

    let last = service
        .get_products_paginated(&drinks(2).with_page(3))
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert!(!last.has_next_page);
    assert_eq!(last.total_count, 5);

    let beyond = service
        .get_products_paginated(&drinks(2).with_page(4))
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert!(!beyond.has_next_page);
}

#[tokio::test]
async fn test_concatenated_pages_keep_order_without_duplicates() {
    let service = service();
    let params = QueryParams {
        limit: 3,
        sort_by: SortBy::Price,
        sort_order: SortOrder::Desc,
        ..QueryParams::default()
    };

    let mut all: Vec<Product> = Vec::new();
    let mut page = 1;
    loop {
        let result = service
            .get_products_paginated(&params.with_page(page))
            .await
            .unwrap();
        all.extend(result.items);
        if !result.has_next_page {
            break;
        }
        page += 1;
    }

    assert_eq!(page, 3);
    assert_eq!(all.len(), sample_products().len());
    let ids: HashSet<_> = all.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids.len(), all.len());
    assert!(all.windows(2).all(|w| w[0].price >= w[1].price));
}

#[tokio::test]
async fn test_load_more_survives_concurrent_insert() {
    let service = service();
    let params = drinks(3);
    let mut list = PageAccumulator::new();

    let first = service.get_products_paginated(&params).await.unwrap();
    assert_eq!(list.apply(&params, first), 3);

    // A new drink sorting first shifts the boundary by one row
    service
        .source()
        .upsert(Product::new("d6", "Apple Juice", "drinks", cents(325)))
        .unwrap();

    let next = list.next_params().unwrap();
    let second = service.get_products_paginated(&next).await.unwrap();
    assert_eq!(list.apply(&next, second), 2);

    let ids: HashSet<_> = list.items().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), list.items().len());
    assert_eq!(list.items().len(), 5);
    assert!(!list.has_next_page());
}

// ============================================================================
// Filtering
// ============================================================================

#[tokio::test]
async fn test_search_matches_catalog_store() {
    let service = service();
    let store = sample_store();

    for query in ["cola", "COLA", "fizz", "snack", "brew"] {
        let params = QueryParams {
            query: Some(query.to_string()),
            limit: 50,
            ..QueryParams::default()
        };
        let page = service.get_products_paginated(&params).await.unwrap();

        let mut from_service: Vec<_> = page.items.iter().map(|p| p.id.as_str()).collect();
        let mut from_store: Vec<_> = store
            .search_items(query)
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();
        from_service.sort_unstable();
        from_store.sort_unstable();

        assert_eq!(from_service, from_store, "query {query:?}");
    }
}

#[tokio::test]
async fn test_all_category_and_blank_query_do_not_filter() {
    let service = service();
    let params = QueryParams {
        category: Some(CategoryId::from("all")),
        query: Some("   ".to_string()),
        ..QueryParams::default()
    };

    let page = service.get_products_paginated(&params).await.unwrap();
    assert_eq!(page.total_count, 8);

    let store = sample_store();
    assert_eq!(store.items_by_category(&CategoryId::from("all")).len(), 8);
    assert_eq!(store.items_by_category(&CategoryId::from("snacks")).len(), 2);
}

#[test]
fn test_facets_follow_snapshot() {
    let mut store = sample_store();
    let count = |store: &pineapple_pos_engine::CatalogStore, id: &str| {
        store
            .facets()
            .iter()
            .find(|f| f.id.as_str() == id)
            .map(|f| f.count)
    };

    assert_eq!(store.facets()[0].id.as_str(), "all");
    assert_eq!(count(&store, "all"), Some(8));
    assert_eq!(count(&store, "drinks"), Some(5));

    let fewer: Vec<Product> = sample_products()
        .into_iter()
        .filter(|p| p.category.as_str() != "drinks")
        .collect();
    store.replace_snapshot(fewer);

    assert_eq!(count(&store, "all"), Some(3));
    assert_eq!(count(&store, "drinks"), Some(0));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_storage_failure_is_retryable() {
    let notifier = RecordingNotifier::new();
    let service = ProductQueryService::new(UnreachableSource, notifier.clone());

    let err = service
        .get_products_paginated(&QueryParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::Storage(_)));
    assert!(err.is_retryable());
    assert_eq!(
        notifier.events(),
        vec![EngineEvent::QueryFailed {
            message: "Products could not be loaded. Please try again.".to_string(),
            retryable: true,
        }]
    );
}

#[tokio::test]
async fn test_invalid_params_are_not_retryable() {
    let notifier = RecordingNotifier::new();
    let service = ProductQueryService::new(
        InMemoryProductSource::new(sample_products()),
        notifier.clone(),
    );

    for params in [
        QueryParams::default().with_page(0),
        QueryParams {
            limit: 0,
            ..QueryParams::default()
        },
    ] {
        let err = service.get_products_paginated(&params).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidParams(_)));
        assert!(!err.is_retryable());
    }

    assert!(notifier.events().iter().all(|e| matches!(
        e,
        EngineEvent::QueryFailed {
            retryable: false,
            ..
        }
    )));
}
