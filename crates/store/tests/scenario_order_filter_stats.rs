//! Scenario: order counts do not depend on the displayed filter.
//!
//! The counters above the order list are always computed from an unfiltered
//! listing. Narrowing the filter first refreshes the counts from the full
//! listing, then loads only the matching subset for display.

mod common;

use common::{FakeBackend, mixed_orders, portfolio, store_for};
use core_types::{OrderStatus, StatusFilter};
use rust_decimal_macros::dec;
use store::{OrderStats, Severity, StoreError};

const FULL_COUNTS: OrderStats = OrderStats {
    total: 7,
    filled: 3,
    pending: 2,
    cancelled: 1,
    rejected: 1,
};

#[tokio::test]
async fn narrowing_the_filter_keeps_counts_of_the_full_listing() {
    let backend = FakeBackend::new();
    backend
        .with_portfolio(1, portfolio(dec!(10000), vec![]))
        .with_orders(1, mixed_orders());
    let store = store_for(&backend);

    store.fetch_orders(StatusFilter::All).await.unwrap();
    let state = store.snapshot();
    assert_eq!(state.orders.len(), 7);
    assert_eq!(state.order_stats, FULL_COUNTS);

    store.set_order_filter(StatusFilter::Filled).await.unwrap();
    let state = store.snapshot();
    assert_eq!(state.orders_filter, StatusFilter::Filled);
    assert_eq!(state.orders.len(), 3);
    assert!(state.orders.iter().all(|o| o.status == OrderStatus::Filled));
    assert_eq!(state.order_stats, FULL_COUNTS);

    // One unfiltered listing for the counts, then the filtered one.
    let calls = backend.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        [
            "GET /orders/user/1?limit=200",
            "GET /orders/user/1?status=FILLED&limit=200",
        ]
    );
}

#[tokio::test]
async fn switching_back_to_all_needs_a_single_listing() {
    let backend = FakeBackend::new();
    backend.with_orders(1, mixed_orders());
    let store = store_for(&backend);

    store.set_order_filter(StatusFilter::Rejected).await.unwrap();
    assert_eq!(store.snapshot().orders.len(), 1);

    let before = backend.count("GET /orders");
    store.set_order_filter(StatusFilter::All).await.unwrap();
    assert_eq!(backend.count("GET /orders"), before + 1);

    let state = store.snapshot();
    assert_eq!(state.orders.len(), 7);
    assert_eq!(state.order_stats, FULL_COUNTS);
}

#[tokio::test]
async fn failed_count_refresh_stops_before_the_filtered_listing() {
    let backend = FakeBackend::new();
    backend.with_orders(1, mixed_orders());
    let store = store_for(&backend);
    store.fetch_orders(StatusFilter::All).await.unwrap();

    backend.fail("orders");
    let err = store.set_order_filter(StatusFilter::New).await.unwrap_err();
    assert!(matches!(err, StoreError::Api(_)));

    let state = store.snapshot();
    // The filter change itself is applied, the displayed data is not touched.
    assert_eq!(state.orders_filter, StatusFilter::New);
    assert_eq!(state.orders.len(), 7);
    assert_eq!(state.order_stats, FULL_COUNTS);
    assert_eq!(state.notification.message, "Failed to filter orders");
    assert_eq!(state.notification.severity, Severity::Error);
    assert!(!state.loading.orders);
    assert_eq!(backend.count("GET /orders/user/1?status=NEW"), 0);
}

#[tokio::test]
async fn refresh_uses_the_active_filter() {
    let backend = FakeBackend::new();
    backend
        .with_portfolio(1, portfolio(dec!(500), vec![]))
        .with_orders(1, mixed_orders());
    let store = store_for(&backend);

    store.set_order_filter(StatusFilter::New).await.unwrap();
    let outcome = store.refresh_session_data().await;
    assert!(outcome.is_ok());

    assert_eq!(backend.count("GET /orders/user/1?status=NEW"), 2);
    let state = store.snapshot();
    assert_eq!(state.orders.len(), 2);
    assert_eq!(state.order_stats, FULL_COUNTS);
    assert!(!state.loading.any());
}
