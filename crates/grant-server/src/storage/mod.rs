//! Roster storage
//!
//! Trait-based abstraction over the officer roster and its audit log, with
//! an in-memory backend (default) and a PostgreSQL backend behind the
//! `postgres` feature.
//!
//! Single-row updates rely on the backend's row atomicity; concurrent mark
//! adjustments on one officer are last-write-wins. Only `import_officers`
//! spans several rows and runs in one transaction.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grant_core::{AuditAction, OfficerRow};
use std::fmt::Debug;

/// Column limits shared by every backend
pub const MAX_DISCORD_ID_LEN: usize = 32;
pub const MAX_USERNAME_LEN: usize = 100;
pub const MAX_RANK_LEN: usize = 64;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// A stored officer
#[derive(Debug, Clone, PartialEq)]
pub struct Officer {
    /// Insertion-order key
    pub officer_id: i64,
    pub discord_id: String,
    pub discord_username: String,
    pub marks: i64,
    pub rank: Option<String>,
    pub is_blacklisted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Officer {
    pub fn to_row(&self) -> OfficerRow {
        OfficerRow {
            discord_id: self.discord_id.clone(),
            discord_username: self.discord_username.clone(),
            marks: self.marks,
            rank: self.rank.clone(),
            is_blacklisted: self.is_blacklisted,
        }
    }
}

/// Audit entry to append
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub actor_discord_id: String,
    pub target_discord_id: Option<String>,
    pub metadata: serde_json::Value,
}

impl NewAuditEntry {
    pub fn new(action: AuditAction, actor: impl Into<String>) -> Self {
        Self {
            action,
            actor_discord_id: actor.into(),
            target_discord_id: None,
            metadata: serde_json::json!({}),
        }
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target_discord_id = Some(target.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A stored audit entry
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub id: i64,
    pub action: AuditAction,
    pub actor_discord_id: String,
    pub target_discord_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Storage backend for the officer roster and audit log
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait RosterStore: Send + Sync + Debug {
    // =========================================================================
    // Officers
    // =========================================================================

    /// Get an officer by platform user id
    async fn find_officer(&self, discord_id: &str) -> Result<Option<Officer>, StorageError>;

    /// Create the officer, or refresh only the username if it exists
    async fn register_officer(&self, discord_id: &str, discord_username: &str) -> Result<(), StorageError>;

    /// Overwrite the mark count (clamped to zero). Returns whether a row matched.
    async fn update_marks(&self, discord_id: &str, marks: i64) -> Result<bool, StorageError>;

    /// Overwrite the rank label. Returns whether a row matched.
    async fn set_rank(&self, discord_id: &str, rank: &str) -> Result<bool, StorageError>;

    /// Set the blacklist flag. Returns whether a row matched.
    async fn set_blacklisted(&self, discord_id: &str, blacklisted: bool) -> Result<bool, StorageError>;

    /// Delete an officer. Returns whether a row was removed.
    async fn remove_officer(&self, discord_id: &str) -> Result<bool, StorageError>;

    /// Number of officers on the roster
    async fn count_officers(&self) -> Result<u64, StorageError>;

    // =========================================================================
    // Bulk transfer
    // =========================================================================

    /// One page of officers in insertion order
    async fn export_officers(&self, limit: i64, offset: i64) -> Result<Vec<OfficerRow>, StorageError>;

    /// Upsert every row in a single transaction.
    ///
    /// On error no row from the batch is kept. Returns the rows written.
    async fn import_officers(&self, rows: &[OfficerRow]) -> Result<usize, StorageError>;

    // =========================================================================
    // Audit log
    // =========================================================================

    /// Append an audit entry; the store assigns id and timestamp
    async fn append_audit(&self, entry: NewAuditEntry) -> Result<(), StorageError>;

    /// Most recent audit entries, newest first
    async fn recent_audit(&self, limit: i64) -> Result<Vec<AuditEntry>, StorageError>;
}

/// Check a row against the column limits
pub(crate) fn check_row(row: &OfficerRow) -> Result<(), StorageError> {
    check_len("discord_id", &row.discord_id, MAX_DISCORD_ID_LEN)?;
    check_len("discord_username", &row.discord_username, MAX_USERNAME_LEN)?;
    if let Some(rank) = &row.rank {
        check_len("rank", rank, MAX_RANK_LEN)?;
    }
    if row.marks < 0 {
        return Err(StorageError::Constraint(format!(
            "marks must be non-negative, got {}",
            row.marks
        )));
    }
    Ok(())
}

pub(crate) fn check_len(column: &str, value: &str, max: usize) -> Result<(), StorageError> {
    let len = value.chars().count();
    if len > max {
        return Err(StorageError::Constraint(format!(
            "{} is {} characters, column allows {}",
            column, len, max
        )));
    }
    Ok(())
}
