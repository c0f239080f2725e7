//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! pos-cli --catalog catalog.yaml catalog categories
//! pos-cli --catalog catalog.yaml catalog search cola
//! pos-cli catalog page --page 2 --category drinks --sort-by price
//! ```

use std::sync::Arc;

use tracing::info;

use pineapple_pos_core::Product;
use pineapple_pos_engine::{
    EngineConfig, EngineError, InMemoryProductSource, ProductQueryService, ProductSource,
    QueryPage, QueryParams, TracingNotifier,
};

use super::{CatalogBackend, CommandError};

/// Log category facets, `all` first.
pub fn categories(backend: &CatalogBackend) -> Result<(), CommandError> {
    let CatalogBackend::Memory(store) = backend else {
        return Err(CommandError::SimpleModeOnly("catalog categories"));
    };

    for facet in store.facets() {
        info!("{:<16} {:<24} {:>5}", facet.id.as_str(), facet.name, facet.count);
    }
    Ok(())
}

/// Search by name, brand or category.
///
/// In paginated mode only the first page of matches is shown.
pub async fn search(
    backend: CatalogBackend,
    query: &str,
    config: &EngineConfig,
) -> Result<(), CommandError> {
    match backend {
        CatalogBackend::Memory(store) => {
            let matches = store.search_items(query);
            info!(query, matches = matches.len(), "Search results");
            for product in matches {
                log_product(product);
            }
            Ok(())
        }
        CatalogBackend::Database(repository) => {
            let params = QueryParams {
                limit: config.page_size,
                query: Some(query.to_string()),
                ..QueryParams::default()
            };
            let page = fetch(repository, &params, config).await?;
            log_page(&page);
            Ok(())
        }
    }
}

/// Fetch and log one page.
pub async fn page(
    backend: CatalogBackend,
    params: &QueryParams,
    config: &EngineConfig,
) -> Result<(), CommandError> {
    let page = match backend {
        CatalogBackend::Memory(store) => {
            let source = InMemoryProductSource::new(store.products().to_vec());
            fetch(source, params, config).await?
        }
        CatalogBackend::Database(repository) => fetch(repository, params, config).await?,
    };
    log_page(&page);
    Ok(())
}

async fn fetch<S: ProductSource>(
    source: S,
    params: &QueryParams,
    config: &EngineConfig,
) -> Result<QueryPage, CommandError> {
    let service = ProductQueryService::new(source, Arc::new(TracingNotifier))
        .with_cache_ttl(config.query_cache_ttl);
    service
        .get_products_paginated(params)
        .await
        .map_err(|e| CommandError::Engine(EngineError::from(e)))
}

fn log_page(page: &QueryPage) {
    info!(
        page = page.page,
        total_pages = page.total_pages,
        total_count = page.total_count,
        has_next_page = page.has_next_page,
        "Products"
    );
    for product in &page.items {
        log_product(product);
    }
}

fn log_product(product: &Product) {
    let badge = product.badge.map_or_else(String::new, |b| format!("[{b}]"));
    info!(
        "{:<12} {:<32} {:<12} {:>9} {badge}",
        product.id.as_str(),
        product.name,
        product.category.as_str(),
        product.price
    );
}
