//! Officer roster domain types
//!
//! The wire row used by export/import, the audit action vocabulary, and
//! the mark arithmetic shared by every store backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One officer as carried in export/import payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerRow {
    pub discord_id: String,
    pub discord_username: String,
    pub marks: i64,
    pub rank: Option<String>,
    pub is_blacklisted: bool,
}

impl OfficerRow {
    /// Coerce one loosely-typed import row.
    ///
    /// Returns `None` when the id or username is missing or empty. Marks
    /// become a non-negative integer (default 0), an empty rank becomes
    /// unset, and the blacklist flag takes the value's truthiness.
    pub fn from_import_value(value: &Value) -> Option<Self> {
        let row = value.as_object()?;
        let discord_id = text(row.get("discord_id")?)?;
        let discord_username = text(row.get("discord_username")?)?;

        Some(Self {
            discord_id,
            discord_username,
            marks: clamp_marks(row.get("marks").map(integer).unwrap_or(0)),
            rank: row.get("rank").and_then(text),
            is_blacklisted: row.get("is_blacklisted").map(truthy).unwrap_or(false),
        })
    }
}

/// Non-empty text from a string or number
fn text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn integer(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Marks can never be negative
pub fn clamp_marks(marks: i64) -> i64 {
    marks.max(0)
}

/// Direction of a mark adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarksAdjustment {
    Add,
    Subtract,
}

impl MarksAdjustment {
    /// New total after applying a positive `amount` to `current`
    pub fn apply(self, current: i64, amount: i64) -> i64 {
        match self {
            MarksAdjustment::Add => clamp_marks(current.saturating_add(amount)),
            MarksAdjustment::Subtract => clamp_marks(current.saturating_sub(amount)),
        }
    }

    pub fn audit_action(self) -> AuditAction {
        match self {
            MarksAdjustment::Add => AuditAction::MarksAdd,
            MarksAdjustment::Subtract => AuditAction::MarksSubtract,
        }
    }
}

/// Blacklist option value; anything other than `on` means off
pub fn blacklist_flag(state: &str) -> bool {
    state == "on"
}

/// Fixed vocabulary of audited actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Register,
    Promote,
    Demote,
    Remove,
    Blacklist,
    MarksAdd,
    MarksSubtract,
    DeveloperExport,
    DeveloperImport,
}

impl AuditAction {
    pub const ALL: [AuditAction; 9] = [
        AuditAction::Register,
        AuditAction::Promote,
        AuditAction::Demote,
        AuditAction::Remove,
        AuditAction::Blacklist,
        AuditAction::MarksAdd,
        AuditAction::MarksSubtract,
        AuditAction::DeveloperExport,
        AuditAction::DeveloperImport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "register",
            AuditAction::Promote => "promote",
            AuditAction::Demote => "demote",
            AuditAction::Remove => "remove",
            AuditAction::Blacklist => "blacklist",
            AuditAction::MarksAdd => "marks_add",
            AuditAction::MarksSubtract => "marks_subtract",
            AuditAction::DeveloperExport => "developer_export",
            AuditAction::DeveloperImport => "developer_import",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == tag)
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subtract_clamps_at_zero() {
        assert_eq!(MarksAdjustment::Subtract.apply(3, 5), 0);
        assert_eq!(MarksAdjustment::Subtract.apply(5, 3), 2);
        assert_eq!(MarksAdjustment::Add.apply(5, 3), 8);
    }

    #[test]
    fn test_import_row_coercion() {
        let row = OfficerRow::from_import_value(&json!({
            "discord_id": 1234,
            "discord_username": "rook",
            "marks": "-4",
            "rank": "",
            "is_blacklisted": "1"
        }))
        .unwrap();

        assert_eq!(row.discord_id, "1234");
        assert_eq!(row.marks, 0);
        assert_eq!(row.rank, None);
        assert!(row.is_blacklisted);
    }

    #[test]
    fn test_import_row_defaults() {
        let row = OfficerRow::from_import_value(&json!({
            "discord_id": "1",
            "discord_username": "rook"
        }))
        .unwrap();

        assert_eq!(row.marks, 0);
        assert_eq!(row.rank, None);
        assert!(!row.is_blacklisted);
    }

    #[test]
    fn test_import_row_requires_id_and_username() {
        assert!(OfficerRow::from_import_value(&json!({ "discord_username": "rook" })).is_none());
        assert!(OfficerRow::from_import_value(&json!({ "discord_id": "", "discord_username": "rook" })).is_none());
        assert!(OfficerRow::from_import_value(&json!({ "discord_id": "1", "discord_username": null })).is_none());
        assert!(OfficerRow::from_import_value(&json!("not a row")).is_none());
    }

    #[test]
    fn test_blacklist_flag_only_on() {
        assert!(blacklist_flag("on"));
        assert!(!blacklist_flag("off"));
        assert!(!blacklist_flag("ON"));
        assert!(!blacklist_flag("yes"));
    }

    #[test]
    fn test_audit_action_tags() {
        for action in AuditAction::ALL {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
            assert_eq!(serde_json::to_value(action).unwrap(), json!(action.as_str()));
        }
        assert_eq!(AuditAction::parse("delete"), None);
    }
}
