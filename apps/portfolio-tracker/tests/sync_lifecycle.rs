//! Sync Lifecycle Integration Tests
//!
//! Exercises the full path from symbol submission to rendered holdings:
//! quote fetch over HTTP, commit into the document store, and the live
//! subscription mirroring snapshots back into the observable state.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::json;
use tokio::sync::watch;
use tokio::time::timeout;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use portfolio_tracker::application::services::BootstrapSettings;
use portfolio_tracker::{
    AlphaVantageClient, Fault, Identity, LocalIdentityProvider, MemoryHoldingStore,
    PortfolioTracker, QuoteSettings, SyncState,
};

fn quote_body(symbol: &str, price: &str) -> serde_json::Value {
    json!({
        "Global Quote": {
            "01. symbol": symbol,
            "02. open": "149.50",
            "03. high": "151.20",
            "04. low": "148.90",
            "05. price": price,
            "06. volume": "1234567",
            "07. latest trading day": "2025-01-17",
            "08. previous close": "148.00",
            "09. change": "2.00",
            "10. change percent": "1.3514%"
        }
    })
}

fn settings() -> BootstrapSettings {
    BootstrapSettings {
        provider_config: Some("{\"projectId\":\"demo\"}".to_string()),
        initial_token: None,
    }
}

async fn tracker_for(
    server: &MockServer,
    store: Arc<MemoryHoldingStore>,
) -> (PortfolioTracker, Identity) {
    let identity = Identity::new("u1");
    let identity_provider = Arc::new(LocalIdentityProvider::with_identity(identity.clone()));
    let quotes = Arc::new(
        AlphaVantageClient::new(&QuoteSettings {
            api_key: "demo-key".to_string(),
            base_url: server.uri(),
            timeout: Duration::from_secs(2),
        })
        .unwrap(),
    );

    let tracker = PortfolioTracker::new(settings(), identity_provider, store, quotes);
    tracker.start().await;
    (tracker, identity)
}

/// Wait until the observed state satisfies `predicate`.
async fn wait_for(
    states: &mut watch::Receiver<SyncState>,
    predicate: impl Fn(&SyncState) -> bool,
) -> SyncState {
    let observed = timeout(Duration::from_secs(2), async {
        loop {
            let state = states.borrow_and_update().clone();
            if predicate(&state) {
                return state;
            }
            states.changed().await.unwrap();
        }
    })
    .await;
    observed.expect("state did not reach the expected shape in time")
}

#[tokio::test]
async fn submitted_symbol_appears_in_holdings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("symbol", "AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body("AAPL", "150.00")))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryHoldingStore::new("test-app"));
    let (tracker, _identity) = tracker_for(&server, store).await;
    let mut states = tracker.subscribe();
    wait_for(&mut states, |s| s.auth_ready).await;

    let symbol = tracker.add_symbol("aapl").await.unwrap();
    assert_eq!(symbol.as_str(), "AAPL");

    let state = wait_for(&mut states, |s| !s.holdings.is_empty()).await;
    assert_eq!(state.holdings.len(), 1);
    assert_eq!(state.holdings[0].id, "AAPL");
    assert_eq!(state.holdings[0].price, Decimal::new(15000, 2));
    assert_eq!(state.holdings[0].change_percent, Decimal::new(13514, 4));
    assert!(state.fault.is_none());

    tracker.shutdown();
    tracker.join().await;
}

#[tokio::test]
async fn resubmitting_a_symbol_replaces_instead_of_duplicating() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body("AAPL", "151.00")))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryHoldingStore::new("test-app"));
    let (tracker, _identity) = tracker_for(&server, store).await;
    let mut states = tracker.subscribe();
    wait_for(&mut states, |s| s.auth_ready).await;

    tracker.add_symbol("AAPL").await.unwrap();
    tracker.add_symbol("aapl ").await.unwrap();

    let state = wait_for(&mut states, |s| {
        s.holdings.len() == 1 && s.holdings[0].price == Decimal::new(15100, 2)
    })
    .await;
    assert_eq!(state.holdings[0].id, "AAPL");

    tracker.shutdown();
    tracker.join().await;
}

#[tokio::test]
async fn removal_empties_the_mirror() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body("AAPL", "150.00")))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryHoldingStore::new("test-app"));
    let (tracker, _identity) = tracker_for(&server, store).await;
    let mut states = tracker.subscribe();
    wait_for(&mut states, |s| s.auth_ready).await;

    tracker.add_symbol("AAPL").await.unwrap();
    wait_for(&mut states, |s| !s.holdings.is_empty()).await;

    tracker.remove("AAPL").await.unwrap();
    let state = wait_for(&mut states, |s| s.holdings.is_empty()).await;
    assert!(state.fault.is_none());

    tracker.shutdown();
    tracker.join().await;
}

#[tokio::test]
async fn subscription_interruption_retains_holdings_and_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body("AAPL", "150.00")))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryHoldingStore::new("test-app"));
    let (tracker, identity) = tracker_for(&server, Arc::clone(&store)).await;
    let mut states = tracker.subscribe();
    wait_for(&mut states, |s| s.auth_ready).await;

    tracker.add_symbol("AAPL").await.unwrap();
    wait_for(&mut states, |s| !s.holdings.is_empty()).await;

    store.interrupt(&identity, "stream reset");
    let state = wait_for(&mut states, |s| s.fault.is_some()).await;
    assert!(matches!(state.fault, Some(Fault::Sync(_))));
    // The last good snapshot survives the interruption.
    assert_eq!(state.holdings.len(), 1);

    // A fresh snapshot clears the sync fault.
    tracker.add_symbol("AAPL").await.unwrap();
    let state = wait_for(&mut states, |s| s.fault.is_none()).await;
    assert_eq!(state.holdings.len(), 1);

    tracker.shutdown();
    tracker.join().await;
}

#[tokio::test]
async fn unconfigured_tracker_surfaces_a_blocking_fault() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryHoldingStore::new("test-app"));
    let identity_provider = Arc::new(LocalIdentityProvider::new());
    let quotes = Arc::new(
        AlphaVantageClient::new(&QuoteSettings {
            api_key: "demo-key".to_string(),
            base_url: server.uri(),
            timeout: Duration::from_secs(2),
        })
        .unwrap(),
    );

    let tracker = PortfolioTracker::new(
        BootstrapSettings {
            provider_config: None,
            initial_token: None,
        },
        identity_provider,
        store,
        quotes,
    );
    tracker.start().await;

    let state = tracker.state();
    assert!(!state.auth_ready);
    assert!(matches!(state.fault, Some(Fault::Unconfigured)));
    assert!(state.fault.unwrap().is_blocking());

    // Submissions cannot proceed without an identity.
    let fault = tracker.add_symbol("AAPL").await.unwrap_err();
    assert!(matches!(fault, Fault::Validation(_)));
}

#[tokio::test]
async fn anonymous_bootstrap_adopts_a_minted_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body("MSFT", "410.00")))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryHoldingStore::new("test-app"));
    let identity_provider = Arc::new(LocalIdentityProvider::new());
    let quotes = Arc::new(
        AlphaVantageClient::new(&QuoteSettings {
            api_key: "demo-key".to_string(),
            base_url: server.uri(),
            timeout: Duration::from_secs(2),
        })
        .unwrap(),
    );

    let tracker = PortfolioTracker::new(settings(), identity_provider, store, quotes);
    tracker.start().await;

    let state = tracker.state();
    assert!(state.auth_ready);
    assert!(state.identity.is_some());
    assert!(state.fault.is_none());

    let mut states = tracker.subscribe();
    tracker.add_symbol("MSFT").await.unwrap();
    wait_for(&mut states, |s| !s.holdings.is_empty()).await;

    tracker.shutdown();
    tracker.join().await;
}
