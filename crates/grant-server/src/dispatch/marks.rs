//! `/marks` handlers

use grant_core::{InteractionResponse, MarksAdjustment};
use serde_json::json;
use tracing::info;

use super::{officer_not_found, DispatchError, Dispatcher, Invocation};
use crate::storage::NewAuditEntry;

impl Dispatcher {
    /// Mark count of the named officer, or of the caller
    pub(super) async fn marks_get(
        &self,
        invocation: &Invocation<'_>,
    ) -> Result<InteractionResponse, DispatchError> {
        let target_id = invocation
            .target("officer")
            .map(|u| u.id.as_str())
            .unwrap_or(invocation.caller.id.as_str());

        let Some(officer) = self.store.find_officer(target_id).await? else {
            return Ok(officer_not_found());
        };

        Ok(InteractionResponse::message(format!(
            "{} has **{}** marks.",
            officer.discord_username, officer.marks
        )))
    }

    /// Add to or subtract from an existing officer's marks.
    ///
    /// The roster write happens before the audit append; a failed write
    /// leaves no audit entry.
    pub(super) async fn marks_adjust(
        &self,
        invocation: &Invocation<'_>,
        adjustment: MarksAdjustment,
    ) -> Result<InteractionResponse, DispatchError> {
        let amount = invocation.options.integer("amount").unwrap_or(0);
        let target = match invocation.target("officer") {
            Some(target) if amount > 0 => target,
            _ => return Ok(InteractionResponse::message("Invalid officer or amount.")),
        };

        let Some(officer) = self.store.find_officer(&target.id).await? else {
            return Ok(officer_not_found());
        };

        let new_marks = adjustment.apply(officer.marks, amount);
        if !self.store.update_marks(&target.id, new_marks).await? {
            return Ok(officer_not_found());
        }

        let action = adjustment.audit_action();
        self.store
            .append_audit(
                NewAuditEntry::new(action, invocation.caller.id.as_str())
                    .target(target.id.as_str())
                    .metadata(json!({ "amount": amount, "new_marks": new_marks })),
            )
            .await?;

        info!(
            actor = %invocation.caller.id,
            target = %target.id,
            action = %action,
            amount = amount,
            new_marks = new_marks,
            "Adjusted marks"
        );

        Ok(InteractionResponse::message(format!(
            "{} now has **{}** marks.",
            officer.discord_username, new_marks
        )))
    }
}
