//! Officer export/import payloads
//!
//! An export page is a JSON envelope, serialized compactly and base64
//! encoded so it can be pasted back into an `import` command. The encoded
//! text must fit into a single chat message.

use base64::{
    alphabet,
    engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
    engine::DecodePaddingMode,
    Engine,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GrantError, Result};
use crate::roster::OfficerRow;
use crate::schema::EXPORT_LIMIT_MAX;

/// Envelope format version
pub const EXPORT_VERSION: u32 = 1;

/// Envelope type tag
pub const EXPORT_TYPE: &str = "officers_export";

/// Largest encoded export that is returned to the caller
pub const MAX_ENCODED_EXPORT_LEN: usize = 1700;

/// Rows per page when no limit is given
pub const DEFAULT_EXPORT_LIMIT: i64 = 50;

/// Import decoder; padding is often lost when a payload is copied out of chat
const IMPORT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Clamp a requested page size into `[1, 500]`, default 50
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_EXPORT_LIMIT)
        .clamp(1, EXPORT_LIMIT_MAX)
}

/// Clamp a requested offset to `>= 0`, default 0
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Page metadata carried in the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub count: i64,
    pub next_offset: i64,
    pub has_more_possible: bool,
}

impl Pagination {
    pub fn new(limit: i64, offset: i64, count: usize) -> Self {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        Self {
            limit,
            offset,
            count,
            next_offset: offset.saturating_add(count),
            has_more_possible: count == limit,
        }
    }
}

/// Exported page of officers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub version: u32,
    pub created_at: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub pagination: Pagination,
    pub rows: Vec<OfficerRow>,
}

impl ExportEnvelope {
    pub fn new(limit: i64, offset: i64, rows: Vec<OfficerRow>, created_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Secs, false),
            kind: EXPORT_TYPE.to_string(),
            pagination: Pagination::new(limit, offset, rows.len()),
            rows,
        }
    }

    /// Compact JSON, base64 encoded.
    ///
    /// Fails with `ExportTooLarge` rather than returning a truncated page.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        let encoded = STANDARD.encode(json.as_bytes());

        if encoded.len() > MAX_ENCODED_EXPORT_LEN {
            return Err(GrantError::ExportTooLarge {
                length: encoded.len(),
                limit: MAX_ENCODED_EXPORT_LEN,
            });
        }

        Ok(encoded)
    }
}

/// Rows accepted from an import payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBatch {
    pub rows: Vec<OfficerRow>,
    /// Rows dropped for a missing id or username
    pub skipped: usize,
}

/// Decode an import payload into coerced rows.
///
/// Only the `rows` array is read; the rest of the envelope is ignored so
/// hand-built payloads are accepted too.
pub fn decode_import_payload(encoded: &str) -> Result<ImportBatch> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(GrantError::EmptyPayload);
    }

    let json = IMPORT_ENGINE.decode(encoded)?;
    let document: Value = serde_json::from_slice(&json).map_err(|_| GrantError::InvalidFormat)?;

    let rows = document
        .as_object()
        .and_then(|o| o.get("rows"))
        .and_then(Value::as_array)
        .ok_or(GrantError::InvalidFormat)?;

    let accepted: Vec<OfficerRow> = rows.iter().filter_map(OfficerRow::from_import_value).collect();

    Ok(ImportBatch {
        skipped: rows.len() - accepted.len(),
        rows: accepted,
    })
}
