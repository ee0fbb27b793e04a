//! In-memory storage backend
//!
//! Default storage implementation using in-memory maps. Enforces the same
//! column limits as the SQL schema so constraint faults behave alike.
//! Data is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use grant_core::{roster::clamp_marks, OfficerRow};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use super::{
    check_len, check_row, AuditEntry, NewAuditEntry, Officer, RosterStore, StorageError,
    MAX_DISCORD_ID_LEN, MAX_RANK_LEN, MAX_USERNAME_LEN,
};

#[derive(Debug, Clone, Default)]
struct Roster {
    officers: HashMap<String, Officer>,
    next_officer_id: i64,
}

impl Roster {
    /// Insert or update from an import row
    fn upsert_row(&mut self, row: &OfficerRow) -> Result<(), StorageError> {
        check_row(row)?;
        let now = Utc::now();

        match self.officers.get_mut(&row.discord_id) {
            Some(officer) => {
                officer.discord_username = row.discord_username.clone();
                officer.marks = row.marks;
                officer.rank = row.rank.clone();
                officer.is_blacklisted = row.is_blacklisted;
                officer.updated_at = now;
            }
            None => {
                self.next_officer_id += 1;
                self.officers.insert(
                    row.discord_id.clone(),
                    Officer {
                        officer_id: self.next_officer_id,
                        discord_id: row.discord_id.clone(),
                        discord_username: row.discord_username.clone(),
                        marks: row.marks,
                        rank: row.rank.clone(),
                        is_blacklisted: row.is_blacklisted,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(())
    }
}

/// In-memory roster store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    roster: RwLock<Roster>,
    audit: RwLock<Vec<AuditEntry>>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn roster(&self) -> Result<RwLockReadGuard<'_, Roster>, StorageError> {
        self.roster
            .read()
            .map_err(|_| StorageError::Database("roster lock poisoned".into()))
    }

    fn roster_mut(&self) -> Result<RwLockWriteGuard<'_, Roster>, StorageError> {
        self.roster
            .write()
            .map_err(|_| StorageError::Database("roster lock poisoned".into()))
    }

    fn update<F>(&self, discord_id: &str, apply: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut Officer),
    {
        let mut roster = self.roster_mut()?;
        match roster.officers.get_mut(discord_id) {
            Some(officer) => {
                apply(officer);
                officer.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    // =========================================================================
    // Officers
    // =========================================================================

    async fn find_officer(&self, discord_id: &str) -> Result<Option<Officer>, StorageError> {
        Ok(self.roster()?.officers.get(discord_id).cloned())
    }

    async fn register_officer(&self, discord_id: &str, discord_username: &str) -> Result<(), StorageError> {
        check_len("discord_id", discord_id, MAX_DISCORD_ID_LEN)?;
        check_len("discord_username", discord_username, MAX_USERNAME_LEN)?;

        let mut roster = self.roster_mut()?;
        let now = Utc::now();

        if let Some(officer) = roster.officers.get_mut(discord_id) {
            officer.discord_username = discord_username.to_string();
            officer.updated_at = now;
            info!(discord_id = %discord_id, "Refreshed officer username");
            return Ok(());
        }

        roster.next_officer_id += 1;
        let officer = Officer {
            officer_id: roster.next_officer_id,
            discord_id: discord_id.to_string(),
            discord_username: discord_username.to_string(),
            marks: 0,
            rank: None,
            is_blacklisted: false,
            created_at: now,
            updated_at: now,
        };
        roster.officers.insert(discord_id.to_string(), officer);
        info!(discord_id = %discord_id, "Registered officer");
        Ok(())
    }

    async fn update_marks(&self, discord_id: &str, marks: i64) -> Result<bool, StorageError> {
        self.update(discord_id, |o| o.marks = clamp_marks(marks))
    }

    async fn set_rank(&self, discord_id: &str, rank: &str) -> Result<bool, StorageError> {
        check_len("rank", rank, MAX_RANK_LEN)?;
        self.update(discord_id, |o| o.rank = Some(rank.to_string()))
    }

    async fn set_blacklisted(&self, discord_id: &str, blacklisted: bool) -> Result<bool, StorageError> {
        self.update(discord_id, |o| o.is_blacklisted = blacklisted)
    }

    async fn remove_officer(&self, discord_id: &str) -> Result<bool, StorageError> {
        let removed = self.roster_mut()?.officers.remove(discord_id).is_some();
        if removed {
            info!(discord_id = %discord_id, "Removed officer");
        }
        Ok(removed)
    }

    async fn count_officers(&self) -> Result<u64, StorageError> {
        Ok(self.roster()?.officers.len() as u64)
    }

    // =========================================================================
    // Bulk transfer
    // =========================================================================

    async fn export_officers(&self, limit: i64, offset: i64) -> Result<Vec<OfficerRow>, StorageError> {
        let roster = self.roster()?;
        let mut officers: Vec<&Officer> = roster.officers.values().collect();
        officers.sort_by_key(|o| o.officer_id);

        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        Ok(officers
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(Officer::to_row)
            .collect())
    }

    async fn import_officers(&self, rows: &[OfficerRow]) -> Result<usize, StorageError> {
        let mut roster = self.roster_mut()?;

        // Stage on a copy; the live roster is only replaced once every row applied
        let mut staged = roster.clone();
        for row in rows {
            staged.upsert_row(row)?;
        }
        *roster = staged;

        info!(rows = rows.len(), "Imported officers");
        Ok(rows.len())
    }

    // =========================================================================
    // Audit log
    // =========================================================================

    async fn append_audit(&self, entry: NewAuditEntry) -> Result<(), StorageError> {
        let mut audit = self
            .audit
            .write()
            .map_err(|_| StorageError::Database("audit lock poisoned".into()))?;

        let id = audit.len() as i64 + 1;
        audit.push(AuditEntry {
            id,
            action: entry.action,
            actor_discord_id: entry.actor_discord_id,
            target_discord_id: entry.target_discord_id,
            metadata: entry.metadata,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent_audit(&self, limit: i64) -> Result<Vec<AuditEntry>, StorageError> {
        let audit = self
            .audit
            .read()
            .map_err(|_| StorageError::Database("audit lock poisoned".into()))?;

        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(audit.iter().rev().take(limit).cloned().collect())
    }
}
