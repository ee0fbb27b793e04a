//! HTTP Tests
//!
//! Drives the router directly with signed and unsigned requests.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use ed25519_dalek::{Signer, SigningKey};
use grant_core::{DeveloperAllowList, InteractionVerifier, RoleGate};
use grant_server::{create_router, AppState, Dispatcher, MemoryStore, RosterStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// =============================================================================
// Test Helpers
// =============================================================================

const TIMESTAMP: &str = "1700000000";

fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[42u8; 32])
}

fn app_with_store() -> (Router, Arc<MemoryStore>) {
    let key = signing_key();
    let verifier = InteractionVerifier::from_hex(&hex::encode(key.verifying_key().to_bytes()))
        .expect("valid public key");
    let store = Arc::new(MemoryStore::new());
    let dispatcher = Dispatcher::new(store.clone(), RoleGate::new(), DeveloperAllowList::default());

    (create_router(Arc::new(AppState { verifier, dispatcher })), store)
}

fn app() -> Router {
    app_with_store().0
}

fn sign(timestamp: &str, body: &[u8]) -> String {
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    hex::encode(signing_key().sign(&message).to_bytes())
}

fn interaction_request(body: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/interactions")
        .header("content-type", "application/json")
        .header("X-Signature-Timestamp", TIMESTAMP);
    if let Some(signature) = signature {
        builder = builder.header("X-Signature-Ed25519", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn signed(body: &str) -> Request<Body> {
    interaction_request(body, Some(sign(TIMESTAMP, body.as_bytes())))
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Signature Verification
// =============================================================================

#[tokio::test]
async fn test_signed_ping_gets_pong() {
    let response = app().oneshot(signed(r#"{"type":1}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "type": 1 }));
}

#[tokio::test]
async fn test_missing_signature_rejected() {
    let response = app()
        .oneshot(interaction_request(r#"{"type":1}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "invalid request signature");
}

#[tokio::test]
async fn test_tampered_body_rejected() {
    let signature = sign(TIMESTAMP, br#"{"type":1}"#);
    let response = app()
        .oneshot(interaction_request(r#"{"type":2}"#, Some(signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signature_from_other_key_rejected() {
    let body = r#"{"type":1}"#;
    let mut message = TIMESTAMP.as_bytes().to_vec();
    message.extend_from_slice(body.as_bytes());
    let forged = hex::encode(SigningKey::from_bytes(&[9u8; 32]).sign(&message).to_bytes());

    let response = app()
        .oneshot(interaction_request(body, Some(forged)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Dispatch over HTTP
// =============================================================================

#[tokio::test]
async fn test_malformed_json_is_internal_error() {
    let response = app().oneshot(signed("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "type": 4, "data": { "content": "Internal error. Check server logs." } })
    );
}

#[tokio::test]
async fn test_odd_envelopes_get_normal_replies() {
    let cases = [
        (r#"{"type":300}"#, "Unsupported interaction type."),
        (r#"{"type":"2"}"#, "Unsupported interaction type."),
        (r#"{"type":-7,"data":{"name":"ping"}}"#, "Unsupported interaction type."),
        (r#"{"type":2,"data":null}"#, "Unknown command."),
        (r#"{"type":2,"data":{"name":null,"options":null}}"#, "Unknown command."),
    ];

    for (body, expected) in cases {
        let response = app().oneshot(signed(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "body: {}", body);
        assert_eq!(json_body(response).await["data"]["content"], expected, "body: {}", body);
    }
}

#[tokio::test]
async fn test_command_reply_is_ephemeral_message() {
    let (app, store) = app_with_store();
    let body = json!({
        "type": 2,
        "data": { "name": "officer", "options": [{ "name": "register", "type": 1, "options": [] }] },
        "member": { "user": { "id": "300", "username": "carol" }, "roles": [] },
    })
    .to_string();

    let response = app.oneshot(signed(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "type": 4, "data": { "content": "Registered officer: carol.", "flags": 64 } })
    );
    assert_eq!(store.count_officers().await.unwrap(), 1);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_and_ready() {
    let (app, store) = app_with_store();
    store.register_officer("100", "alice").await.unwrap();

    let health = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(json_body(health).await["status"], "ok");

    let ready = app
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        json_body(ready).await,
        json!({ "ready": true, "officer_count": 1 })
    );
}
