//! `/officer` handlers

use grant_core::roster::blacklist_flag;
use grant_core::{AuditAction, InteractionResponse, User, TIER_HR};
use serde_json::json;
use tracing::{info, warn};

use super::{denied_for_tier, officer_not_found, DispatchError, Dispatcher, Invocation};
use crate::storage::NewAuditEntry;

fn officer_required() -> InteractionResponse {
    InteractionResponse::message("Officer argument is required.")
}

impl Dispatcher {
    /// Register the caller, or (HR only) another user.
    ///
    /// Re-registering refreshes the stored username and nothing else.
    pub(super) async fn officer_register(
        &self,
        invocation: &Invocation<'_>,
    ) -> Result<InteractionResponse, DispatchError> {
        let target: &User = invocation.target("user").unwrap_or(&invocation.caller);
        if target.id.is_empty() {
            return Ok(officer_required());
        }

        let is_self = target.id == invocation.caller.id;
        if !is_self && !self.caller_is_at_least(invocation, TIER_HR) {
            warn!(caller = %invocation.caller.id, target = %target.id, "Register of another user denied");
            return Ok(InteractionResponse::message(
                "Permission denied: HR required to register another officer.",
            ));
        }

        self.store
            .register_officer(&target.id, &target.username)
            .await?;
        self.store
            .append_audit(
                NewAuditEntry::new(AuditAction::Register, invocation.caller.id.as_str())
                    .target(target.id.as_str()),
            )
            .await?;

        info!(actor = %invocation.caller.id, target = %target.id, "Officer registered");

        Ok(InteractionResponse::message(format!(
            "Registered officer: {}.",
            target.username
        )))
    }

    /// Officer summary. Blacklist status is shown to HR callers only.
    pub(super) async fn officer_info(
        &self,
        invocation: &Invocation<'_>,
    ) -> Result<InteractionResponse, DispatchError> {
        let target: &User = invocation.target("officer").unwrap_or(&invocation.caller);
        let is_self = target.id == invocation.caller.id;
        let is_hr = self.caller_is_at_least(invocation, TIER_HR);

        if !is_self && !is_hr {
            warn!(caller = %invocation.caller.id, target = %target.id, "Officer info denied");
            return Ok(denied_for_tier(TIER_HR));
        }

        let Some(officer) = self.store.find_officer(&target.id).await? else {
            return Ok(officer_not_found());
        };

        let mut content = format!(
            "Officer: {}\nMarks: {}\nRank: {}",
            officer.discord_username,
            officer.marks,
            officer.rank.as_deref().filter(|r| !r.is_empty()).unwrap_or("N/A")
        );

        if is_hr {
            content.push_str(if officer.is_blacklisted {
                "\nBlacklisted: Yes"
            } else {
                "\nBlacklisted: No"
            });
        }

        Ok(InteractionResponse::message(content))
    }

    /// Delete an officer; audited whether or not a row existed
    pub(super) async fn officer_remove(
        &self,
        invocation: &Invocation<'_>,
    ) -> Result<InteractionResponse, DispatchError> {
        let Some(target) = invocation.target("officer") else {
            return Ok(officer_required());
        };

        let removed = self.store.remove_officer(&target.id).await?;
        self.store
            .append_audit(
                NewAuditEntry::new(AuditAction::Remove, invocation.caller.id.as_str())
                    .target(target.id.as_str())
                    .metadata(json!({ "removed": removed })),
            )
            .await?;

        info!(actor = %invocation.caller.id, target = %target.id, removed = removed, "Officer remove");

        Ok(if removed {
            InteractionResponse::message("Officer removed.")
        } else {
            officer_not_found()
        })
    }

    /// Overwrite the rank label. Promote and demote differ only in the audit tag.
    pub(super) async fn officer_rank(
        &self,
        invocation: &Invocation<'_>,
        action: AuditAction,
    ) -> Result<InteractionResponse, DispatchError> {
        let Some(target) = invocation.target("officer") else {
            return Ok(officer_required());
        };

        if self.store.find_officer(&target.id).await?.is_none() {
            return Ok(officer_not_found());
        }

        let rank = invocation.options.string("rank").unwrap_or("").trim();
        if rank.is_empty() {
            return Ok(InteractionResponse::message("Rank is required."));
        }

        if !self.store.set_rank(&target.id, rank).await? {
            return Ok(officer_not_found());
        }
        self.store
            .append_audit(
                NewAuditEntry::new(action, invocation.caller.id.as_str())
                    .target(target.id.as_str())
                    .metadata(json!({ "rank": rank })),
            )
            .await?;

        info!(actor = %invocation.caller.id, target = %target.id, action = %action, rank = %rank, "Rank updated");

        Ok(InteractionResponse::message(format!(
            "{} updated to rank: {}.",
            target.username, rank
        )))
    }

    /// Set or clear the blacklist flag; only `on` blacklists
    pub(super) async fn officer_blacklist(
        &self,
        invocation: &Invocation<'_>,
    ) -> Result<InteractionResponse, DispatchError> {
        let Some(target) = invocation.target("officer") else {
            return Ok(officer_required());
        };

        if self.store.find_officer(&target.id).await?.is_none() {
            return Ok(officer_not_found());
        }

        let state = invocation.options.string("state").unwrap_or("off");
        let blacklisted = blacklist_flag(state);

        if !self.store.set_blacklisted(&target.id, blacklisted).await? {
            return Ok(officer_not_found());
        }
        self.store
            .append_audit(
                NewAuditEntry::new(AuditAction::Blacklist, invocation.caller.id.as_str())
                    .target(target.id.as_str())
                    .metadata(json!({ "state": state })),
            )
            .await?;

        info!(actor = %invocation.caller.id, target = %target.id, blacklisted = blacklisted, "Blacklist updated");

        Ok(InteractionResponse::message(format!(
            "{} blacklist state: {}.",
            target.username,
            if blacklisted { "ON" } else { "OFF" }
        )))
    }
}
