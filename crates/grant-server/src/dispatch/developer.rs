//! `/command` developer maintenance handlers

use chrono::Utc;
use grant_core::transfer::{clamp_limit, clamp_offset, decode_import_payload};
use grant_core::{AuditAction, ExportEnvelope, GrantError, InteractionResponse};
use serde_json::json;
use tracing::{error, info, warn};

use super::{DispatchError, Dispatcher, Invocation};
use crate::storage::NewAuditEntry;

impl Dispatcher {
    /// Export one page of officers as base64 JSON.
    ///
    /// Pages that encode past the message limit are refused outright and
    /// not audited; the caller retries with a smaller limit.
    pub(super) async fn developer_export(
        &self,
        invocation: &Invocation<'_>,
    ) -> Result<InteractionResponse, DispatchError> {
        let limit = clamp_limit(invocation.options.integer("limit"));
        let offset = clamp_offset(invocation.options.integer("offset"));

        let rows = self.store.export_officers(limit, offset).await?;
        let envelope = ExportEnvelope::new(limit, offset, rows, Utc::now());

        let encoded = match envelope.encode() {
            Ok(encoded) => encoded,
            Err(GrantError::ExportTooLarge { length, limit: max }) => {
                warn!(length = length, max = max, limit = limit, "Export too large");
                return Ok(InteractionResponse::message(
                    "Export too large for one Discord message. Re-run with a lower limit.",
                ));
            }
            Err(e) => return Err(DispatchError::Encoding(e.to_string())),
        };

        let pagination = &envelope.pagination;
        self.store
            .append_audit(
                NewAuditEntry::new(AuditAction::DeveloperExport, invocation.caller.id.as_str())
                    .metadata(json!({
                        "rows": pagination.count,
                        "limit": pagination.limit,
                        "offset": pagination.offset,
                        "next_offset": pagination.next_offset,
                    })),
            )
            .await?;

        info!(
            actor = %invocation.caller.id,
            rows = pagination.count,
            limit = limit,
            offset = offset,
            "Exported officers"
        );

        Ok(InteractionResponse::message(format!(
            "Export payload:\n{}",
            encoded
        )))
    }

    /// Import an export payload in one all-or-nothing transaction
    pub(super) async fn developer_import(
        &self,
        invocation: &Invocation<'_>,
    ) -> Result<InteractionResponse, DispatchError> {
        let payload = invocation.options.string("payload").unwrap_or("");

        let batch = match decode_import_payload(payload) {
            Ok(batch) => batch,
            Err(GrantError::EmptyPayload) => {
                return Ok(InteractionResponse::message("Import payload is required."));
            }
            Err(GrantError::InvalidEncoding(_)) => {
                return Ok(InteractionResponse::message(
                    "Invalid payload: not valid base64.",
                ));
            }
            Err(GrantError::InvalidFormat) => {
                return Ok(InteractionResponse::message(
                    "Invalid payload: JSON format is incorrect.",
                ));
            }
            Err(e) => return Err(DispatchError::Encoding(e.to_string())),
        };

        let imported = match self.store.import_officers(&batch.rows).await {
            Ok(imported) => imported,
            Err(e) => {
                error!(actor = %invocation.caller.id, rows = batch.rows.len(), error = %e, "Import rolled back");
                return Ok(InteractionResponse::message(
                    "Import failed and was rolled back. Check server logs for details.",
                ));
            }
        };

        self.store
            .append_audit(
                NewAuditEntry::new(AuditAction::DeveloperImport, invocation.caller.id.as_str())
                    .metadata(json!({ "imported_rows": imported })),
            )
            .await?;

        info!(
            actor = %invocation.caller.id,
            imported = imported,
            skipped = batch.skipped,
            "Imported officers"
        );

        Ok(InteractionResponse::message(format!(
            "Import successful. Rows processed: {}.",
            imported
        )))
    }
}
