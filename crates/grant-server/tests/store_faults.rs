//! Store Fault Tests
//!
//! Runs commands against a roster whose writes fail:
//! - A failed roster write leaves no audit entry behind
//! - Store faults surface as `DispatchError` and a generic HTTP 500

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use ed25519_dalek::{Signer, SigningKey};
use grant_core::{DeveloperAllowList, Interaction, InteractionVerifier, OfficerRow, RoleGate, TIER_HR, TIER_MR};
use grant_server::storage::{AuditEntry, NewAuditEntry, Officer};
use grant_server::{
    create_router, AppState, DispatchError, Dispatcher, MemoryStore, RosterStore, StorageError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// =============================================================================
// Test Helpers
// =============================================================================

const HR_ROLE: &str = "role-hr";
const FAULT_DETAIL: &str = "replica rejected write on officers";

/// Roster that reads normally but fails every single-row update
#[derive(Debug, Default)]
struct FailingWrites {
    inner: MemoryStore,
}

fn fault() -> StorageError {
    StorageError::Database(FAULT_DETAIL.into())
}

#[async_trait]
impl RosterStore for FailingWrites {
    async fn find_officer(&self, discord_id: &str) -> Result<Option<Officer>, StorageError> {
        self.inner.find_officer(discord_id).await
    }

    async fn register_officer(&self, discord_id: &str, discord_username: &str) -> Result<(), StorageError> {
        self.inner.register_officer(discord_id, discord_username).await
    }

    async fn update_marks(&self, _discord_id: &str, _marks: i64) -> Result<bool, StorageError> {
        Err(fault())
    }

    async fn set_rank(&self, _discord_id: &str, _rank: &str) -> Result<bool, StorageError> {
        Err(fault())
    }

    async fn set_blacklisted(&self, _discord_id: &str, _blacklisted: bool) -> Result<bool, StorageError> {
        Err(fault())
    }

    async fn remove_officer(&self, discord_id: &str) -> Result<bool, StorageError> {
        self.inner.remove_officer(discord_id).await
    }

    async fn count_officers(&self) -> Result<u64, StorageError> {
        self.inner.count_officers().await
    }

    async fn export_officers(&self, limit: i64, offset: i64) -> Result<Vec<OfficerRow>, StorageError> {
        self.inner.export_officers(limit, offset).await
    }

    async fn import_officers(&self, rows: &[OfficerRow]) -> Result<usize, StorageError> {
        self.inner.import_officers(rows).await
    }

    async fn append_audit(&self, entry: NewAuditEntry) -> Result<(), StorageError> {
        self.inner.append_audit(entry).await
    }

    async fn recent_audit(&self, limit: i64) -> Result<Vec<AuditEntry>, StorageError> {
        self.inner.recent_audit(limit).await
    }
}

async fn setup() -> (Dispatcher, Arc<FailingWrites>) {
    let store = Arc::new(FailingWrites::default());
    store.register_officer("300", "carol").await.unwrap();

    let gate = RoleGate::new()
        .with_tier(TIER_MR, [HR_ROLE])
        .with_tier(TIER_HR, [HR_ROLE]);
    let dispatcher = Dispatcher::new(store.clone(), gate, DeveloperAllowList::default());

    (dispatcher, store)
}

/// HR caller acting on carol through `/<family> <sub>`
fn on_carol(family: &str, sub: &str, mut options: Vec<Value>) -> Value {
    options.insert(0, json!({ "name": "officer", "type": 6, "value": "300" }));
    json!({
        "type": 2,
        "data": {
            "name": family,
            "options": [{ "name": sub, "type": 1, "options": options }],
            "resolved": { "users": { "300": { "id": "300", "username": "carol" } } },
        },
        "member": { "user": { "id": "100", "username": "alice" }, "roles": [HR_ROLE] },
    })
}

fn parse(body: &Value) -> Interaction {
    serde_json::from_value(body.clone()).expect("valid interaction")
}

// =============================================================================
// Dispatcher
// =============================================================================

#[tokio::test]
async fn test_failed_marks_write_is_not_audited() {
    let (dispatcher, store) = setup().await;
    let add = on_carol("marks", "add", vec![json!({ "name": "amount", "type": 4, "value": 5 })]);

    let result = dispatcher.dispatch(&parse(&add)).await;

    assert!(matches!(result, Err(DispatchError::Storage(StorageError::Database(_)))));
    assert!(store.recent_audit(10).await.unwrap().is_empty());
    assert_eq!(store.find_officer("300").await.unwrap().unwrap().marks, 0);
}

#[tokio::test]
async fn test_failed_rank_write_is_not_audited() {
    let (dispatcher, store) = setup().await;
    let promote = on_carol("officer", "promote", vec![json!({ "name": "rank", "type": 3, "value": "Captain" })]);

    let result = dispatcher.dispatch(&parse(&promote)).await;

    assert!(matches!(result, Err(DispatchError::Storage(_))));
    assert!(store.recent_audit(10).await.unwrap().is_empty());
    assert!(store.find_officer("300").await.unwrap().unwrap().rank.is_none());
}

#[tokio::test]
async fn test_failed_blacklist_write_is_not_audited() {
    let (dispatcher, store) = setup().await;
    let blacklist = on_carol("officer", "blacklist", vec![json!({ "name": "state", "type": 3, "value": "on" })]);

    let result = dispatcher.dispatch(&parse(&blacklist)).await;

    assert!(matches!(result, Err(DispatchError::Storage(_))));
    assert!(store.recent_audit(10).await.unwrap().is_empty());
}

// =============================================================================
// HTTP
// =============================================================================

#[tokio::test]
async fn test_store_fault_is_generic_internal_error() {
    let (dispatcher, store) = setup().await;
    let key = SigningKey::from_bytes(&[42u8; 32]);
    let verifier = InteractionVerifier::from_hex(&hex::encode(key.verifying_key().to_bytes())).unwrap();
    let app = create_router(Arc::new(AppState { verifier, dispatcher }));

    let body = on_carol("marks", "add", vec![json!({ "name": "amount", "type": 4, "value": 5 })]).to_string();
    let timestamp = "1700000000";
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body.as_bytes());
    let signature = hex::encode(key.sign(&message).to_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/interactions")
        .header("X-Signature-Ed25519", signature)
        .header("X-Signature-Timestamp", timestamp)
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!text.contains(FAULT_DETAIL));
    assert_eq!(
        serde_json::from_str::<Value>(&text).unwrap(),
        json!({ "type": 4, "data": { "content": "Internal error. Check server logs." } })
    );
    assert!(store.recent_audit(10).await.unwrap().is_empty());
}
