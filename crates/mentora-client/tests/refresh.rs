//! Refresh protocol tests: single-flight coordination, the retry-once
//! ceiling, and terminal failure handling, against a mock server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mentora_auth::{InMemoryTokenStore, SharedTokenStore, TokenStore};
use mentora_client::MentoraClient;

fn client_for(server: &MockServer, store: SharedTokenStore) -> MentoraClient {
    MentoraClient::builder()
        .base_url(server.uri())
        .token_store(store)
        .build()
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_expiries_share_a_single_refresh() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemoryTokenStore::with_token("expired1"));

    for resource in ["users", "groups", "assessments"] {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/{resource}")))
            .and(header("authorization", "Bearer expired1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        // each call must come back exactly once with the rotated token
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/{resource}")))
            .and(header("authorization", "Bearer fresh2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource": resource})))
            .expect(1)
            .mount(&server)
            .await;
    }

    // the delay keeps the refresh in flight long enough for the other
    // expiries to queue behind it
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh2"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, store.clone());
    let (users, groups, assessments) = tokio::join!(
        client.get::<Value>("users"),
        client.get::<Value>("groups"),
        client.get::<Value>("assessments"),
    );

    assert_eq!(users.unwrap(), json!({"resource": "users"}));
    assert_eq!(groups.unwrap(), json!({"resource": "groups"}));
    assert_eq!(assessments.unwrap(), json!({"resource": "assessments"}));
    assert_eq!(store.get().as_deref(), Some("fresh2"));

    // the refresh call itself must not carry the expired bearer
    let requests = server.received_requests().await.unwrap();
    let refresh_calls: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/api/v1/auth/refresh")
        .collect();
    assert_eq!(refresh_calls.len(), 1);
    assert!(!refresh_calls[0].headers.contains_key("authorization"));

    server.verify().await;
}

#[tokio::test]
async fn second_expiry_on_the_same_call_is_not_intercepted() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemoryTokenStore::with_token("expired1"));

    // expires again even with the rotated token
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh2"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, store.clone());
    let err = client.users().me().await.unwrap_err();

    // the second 401 surfaces as a plain API error, no second refresh
    match err {
        mentora_client::Error::Api { status, .. } => assert_eq!(status, 401),
        other => panic!("expected Api error, got {other:?}"),
    }
    // the refresh itself succeeded, so its token is still stored
    assert_eq!(store.get().as_deref(), Some("fresh2"));

    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_refresh_fails_every_caller_and_clears_the_store() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemoryTokenStore::with_token("expired1"));

    for resource in ["users", "groups"] {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/{resource}")))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"detail": "session revoked"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let hook_fired = Arc::new(AtomicUsize::new(0));
    let hook_count = hook_fired.clone();
    let client = MentoraClient::builder()
        .base_url(server.uri())
        .token_store(store.clone())
        .on_session_expired(move || {
            hook_count.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let (users, groups) = tokio::join!(client.get::<Value>("users"), client.get::<Value>("groups"));

    // owner and waiter both surface the terminal failure, exactly once each
    assert!(users.unwrap_err().is_session_expired());
    assert!(groups.unwrap_err().is_session_expired());
    assert_eq!(store.get(), None);
    assert_eq!(hook_fired.load(Ordering::SeqCst), 1);

    server.verify().await;
}

#[tokio::test]
async fn malformed_refresh_response_is_a_refresh_failure() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemoryTokenStore::with_token("expired1"));

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    // 200, but no access_token anywhere in the body
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, store.clone());
    let err = client.users().me().await.unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(store.get(), None);

    server.verify().await;
}

#[tokio::test]
async fn refresh_recovers_a_single_expired_call() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemoryTokenStore::with_token("expired1"));

    Mock::given(method("GET"))
        .and(path("/api/v1/groups"))
        .and(header("authorization", "Bearer expired1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/groups"))
        .and(header("authorization", "Bearer fresh2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"group_id": 5})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh2"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, store.clone());

    // the caller never sees the expiry
    let body: Value = client.get("groups").await.unwrap();
    assert_eq!(body, json!({"group_id": 5}));
    assert_eq!(store.get().as_deref(), Some("fresh2"));

    server.verify().await;
}

#[tokio::test]
async fn refresh_state_is_isolated_per_client_instance() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/groups"))
        .and(header("authorization", "Bearer expired1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/groups"))
        .and(header("authorization", "Bearer fresh2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh2"})))
        .expect(2)
        .mount(&server)
        .await;

    // two clients, two token slots, two refreshes — no shared state
    let store_a = Arc::new(InMemoryTokenStore::with_token("expired1"));
    let store_b = Arc::new(InMemoryTokenStore::with_token("expired1"));
    let client_a = client_for(&server, store_a.clone());
    let client_b = client_for(&server, store_b.clone());

    let _: Value = client_a.get("groups").await.unwrap();
    let _: Value = client_b.get("groups").await.unwrap();

    assert_eq!(store_a.get().as_deref(), Some("fresh2"));
    assert_eq!(store_b.get().as_deref(), Some("fresh2"));

    server.verify().await;
}
