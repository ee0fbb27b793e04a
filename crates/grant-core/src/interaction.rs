//! Interaction envelope and reply types
//!
//! Only the fields the dispatcher reads are modelled; unknown fields in
//! the platform payload are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::OptionDefinition;

/// Handshake interaction
pub const INTERACTION_PING: i64 = 1;

/// Slash command interaction
pub const INTERACTION_APPLICATION_COMMAND: i64 = 2;

/// Handshake acknowledgment reply
pub const RESPONSE_PONG: u8 = 1;

/// Message reply
pub const RESPONSE_CHANNEL_MESSAGE: u8 = 4;

/// Reply visible only to the caller
pub const FLAG_EPHEMERAL: u64 = 64;

/// Kind of inbound interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    /// Any other discriminant, including non-integer ones (`None`)
    Other(Option<i64>),
}

/// Integer discriminant if the value is exactly a JSON integer
fn integer_discriminant<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_i64())
}

/// Explicit `null` reads as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Inbound interaction envelope.
///
/// Parsing is lenient about shape: odd discriminants and `null` members
/// become an unsupported or unknown command reply rather than a fault.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type", default, deserialize_with = "integer_discriminant")]
    pub kind: Option<i64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub data: InteractionData,

    #[serde(default)]
    pub member: Option<Member>,
}

/// Command payload of an interaction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<CommandOption>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub resolved: ResolvedData,
}

/// A named option value, or a subcommand group carrying nested options
#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(rename = "type", default, deserialize_with = "integer_discriminant")]
    pub kind: Option<i64>,

    #[serde(default)]
    pub value: Option<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<CommandOption>,
}

/// Entities referenced by option values
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolvedData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: HashMap<String, User>,
}

/// Platform user
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub username: String,
}

/// Guild member who invoked the interaction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
}

impl Interaction {
    pub fn interaction_type(&self) -> InteractionType {
        match self.kind {
            Some(INTERACTION_PING) => InteractionType::Ping,
            Some(INTERACTION_APPLICATION_COMMAND) => InteractionType::ApplicationCommand,
            other => InteractionType::Other(other),
        }
    }

    /// The invoking user; an anonymous placeholder when the member is absent
    pub fn caller(&self) -> User {
        self.member
            .as_ref()
            .and_then(|m| m.user.clone())
            .unwrap_or_else(|| User {
                id: String::new(),
                username: "unknown".into(),
            })
    }

    /// Role ids currently held by the caller
    pub fn caller_roles(&self) -> &[String] {
        self.member
            .as_ref()
            .map(|m| m.roles.as_slice())
            .unwrap_or(&[])
    }

    /// Name of the invoked subcommand (first option group)
    pub fn subcommand_name(&self) -> &str {
        self.data
            .options
            .first()
            .map(|o| o.name.as_str())
            .unwrap_or("")
    }

    /// Options nested under the invoked subcommand
    pub fn subcommand_options(&self) -> &[CommandOption] {
        self.data
            .options
            .first()
            .map(|o| o.options.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a user id supplied as an option value.
    ///
    /// Only ids that are non-empty and present in the resolved table count;
    /// anything else resolves to no target.
    pub fn resolve_user(&self, user_id: Option<&str>) -> Option<&User> {
        match user_id {
            Some(id) if !id.is_empty() => self.data.resolved.users.get(id),
            _ => None,
        }
    }
}

/// Option values bound by name against their declarations.
///
/// Supplied options that are undeclared, or whose value does not match the
/// declared type, are dropped and read back as absent.
#[derive(Debug, Clone, Default)]
pub struct OptionMap {
    values: HashMap<String, Value>,
}

impl OptionMap {
    pub fn bind<'a, I>(declared: I, supplied: &[CommandOption]) -> Self
    where
        I: IntoIterator<Item = &'a OptionDefinition>,
    {
        let declared: Vec<&OptionDefinition> = declared.into_iter().collect();
        let mut values = HashMap::new();

        for option in supplied {
            let Some(value) = option.value.as_ref() else {
                continue;
            };
            let Some(definition) = declared.iter().find(|d| d.name == option.name) else {
                continue;
            };
            if definition.accepts(value) {
                values.entry(option.name.clone()).or_insert_with(|| value.clone());
            }
        }

        Self { values }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            Value::String(s) => s.trim().parse().ok(),
            other => other.as_i64(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Reply returned to the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

/// Message body of a reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl InteractionResponse {
    /// Bare handshake acknowledgment
    pub fn pong() -> Self {
        Self {
            kind: RESPONSE_PONG,
            data: None,
        }
    }

    /// Message visible only to the caller
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: RESPONSE_CHANNEL_MESSAGE,
            data: Some(ResponseData {
                content: content.into(),
                flags: Some(FLAG_EPHEMERAL),
            }),
        }
    }

    /// Generic body for faults; carries no diagnostic detail
    pub fn internal_error() -> Self {
        Self {
            kind: RESPONSE_CHANNEL_MESSAGE,
            data: Some(ResponseData {
                content: "Internal error. Check server logs.".into(),
                flags: None,
            }),
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.content.as_str())
    }
}
