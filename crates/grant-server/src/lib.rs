//! Grant Interaction Server
//!
//! Webhook endpoint for guild officer management commands:
//! - Verifies the Ed25519 signature on every inbound interaction
//! - Gates commands on caller roles and a developer allow-list
//! - Maintains the officer roster and its audit trail
//! - Exports and imports the roster as base64 snapshots
//!
//! ## API Endpoints
//!
//! - `POST /interactions` - Signed interaction webhook
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check with roster size

pub mod api;
pub mod config;
pub mod dispatch;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{ConfigError, GrantConfig};
pub use dispatch::{DispatchError, Dispatcher};
pub use storage::{MemoryStore, RosterStore, StorageError};
#[cfg(feature = "postgres")]
pub use storage::PostgresStore;
