//! Last-issued-wins sequencing of overlapping catalog queries.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use pineapple_pos_core::CategoryId;
use pineapple_pos_engine::{
    NoopNotifier, PageAccumulator, ProductQueryService, QueryParams, RequestSequencer,
};
use pineapple_pos_integration_tests::{SlowCategorySource, sample_products};

fn category(id: &str) -> QueryParams {
    QueryParams {
        category: Some(CategoryId::from(id)),
        ..QueryParams::default()
    }
}

#[tokio::test]
async fn test_slow_earlier_response_is_discarded() {
    let service = Arc::new(ProductQueryService::new(
        SlowCategorySource::new(sample_products(), "drinks", Duration::from_millis(100)),
        Arc::new(NoopNotifier),
    ));
    let sequencer = RequestSequencer::new();
    let (tx, mut rx) = mpsc::channel(2);

    // Operator taps "drinks" then quickly switches to "snacks"
    for params in [category("drinks"), category("snacks")] {
        let token = sequencer.issue();
        let service = Arc::clone(&service);
        let tx = tx.clone();
        tokio::spawn(async move {
            let page = service.get_products_paginated(&params).await;
            let _ = tx.send((token, params, page)).await;
        });
    }
    drop(tx);

    let mut list = PageAccumulator::new();
    let mut arrivals = Vec::new();
    while let Some((token, params, page)) = rx.recv().await {
        let accepted = sequencer.accept(token, page.unwrap());
        arrivals.push((params.category.clone(), accepted.is_some()));
        if let Some(page) = accepted {
            list.apply(&params, page);
        }
    }

    assert_eq!(
        arrivals,
        vec![
            (Some(CategoryId::from("snacks")), true),
            (Some(CategoryId::from("drinks")), false),
        ]
    );
    assert_eq!(list.items().len(), 2);
    assert!(list.items().iter().all(|p| p.category.as_str() == "snacks"));
}

#[tokio::test]
async fn test_only_latest_token_is_current() {
    let sequencer = RequestSequencer::new();
    let first = sequencer.issue();
    let second = sequencer.issue();
    let third = sequencer.issue();

    assert!(first.value() < second.value() && second.value() < third.value());
    assert!(!sequencer.is_current(first));
    assert!(!sequencer.is_current(second));
    assert!(sequencer.is_current(third));

    // Arrival order does not matter, only issue order
    assert_eq!(sequencer.accept(third, "snacks"), Some("snacks"));
    assert_eq!(sequencer.accept(first, "drinks"), None);
}
