//! Command schema
//!
//! Static description of every command, subcommand and option the bot
//! accepts. It is published to the platform by an external registration
//! step and used here to bind incoming options to declared names and types.

use serde::Serialize;
use std::sync::OnceLock;

/// Option type discriminants used by the platform
pub mod option_type {
    pub const SUB_COMMAND: u8 = 1;
    pub const STRING: u8 = 3;
    pub const INTEGER: u8 = 4;
    pub const USER: u8 = 6;
}

/// Top-level command type (chat input)
pub const CHAT_INPUT: u8 = 1;

/// Maximum rows per export page
pub const EXPORT_LIMIT_MAX: i64 = 500;

/// A top-level command
#[derive(Debug, Clone, Serialize)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDefinition>,
}

/// A subcommand or a value option
#[derive(Debug, Clone, Serialize)]
pub struct OptionDefinition {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDefinition>,
}

/// A fixed choice for a string option
#[derive(Debug, Clone, Serialize)]
pub struct OptionChoice {
    pub name: &'static str,
    pub value: &'static str,
}

impl CommandDefinition {
    fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind: CHAT_INPUT,
            options: Vec::new(),
        }
    }

    fn option(mut self, option: OptionDefinition) -> Self {
        self.options.push(option);
        self
    }

    /// Look up a subcommand by name
    pub fn subcommand(&self, name: &str) -> Option<&OptionDefinition> {
        self.options
            .iter()
            .find(|o| o.kind == option_type::SUB_COMMAND && o.name == name)
    }

    /// Value options declared directly on the command
    pub fn value_options(&self) -> impl Iterator<Item = &OptionDefinition> {
        self.options
            .iter()
            .filter(|o| o.kind != option_type::SUB_COMMAND)
    }
}

impl OptionDefinition {
    fn value(kind: u8, name: &'static str, description: &'static str) -> Self {
        Self {
            kind,
            name,
            description,
            required: Some(false),
            choices: Vec::new(),
            min_value: None,
            max_value: None,
            options: Vec::new(),
        }
    }

    fn subcommand(name: &'static str, description: &'static str) -> Self {
        Self {
            required: None,
            ..Self::value(option_type::SUB_COMMAND, name, description)
        }
    }

    fn string(name: &'static str, description: &'static str) -> Self {
        Self::value(option_type::STRING, name, description)
    }

    fn integer(name: &'static str, description: &'static str) -> Self {
        Self::value(option_type::INTEGER, name, description)
    }

    fn user(name: &'static str, description: &'static str) -> Self {
        Self::value(option_type::USER, name, description)
    }

    fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    fn min(mut self, value: i64) -> Self {
        self.min_value = Some(value);
        self
    }

    fn max(mut self, value: i64) -> Self {
        self.max_value = Some(value);
        self
    }

    fn choice(mut self, name: &'static str, value: &'static str) -> Self {
        self.choices.push(OptionChoice { name, value });
        self
    }

    fn option(mut self, option: OptionDefinition) -> Self {
        self.options.push(option);
        self
    }

    /// Whether a supplied JSON value has the shape this option declares
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        match self.kind {
            option_type::STRING | option_type::USER => value.is_string(),
            option_type::INTEGER => {
                value.is_i64()
                    || value.is_u64()
                    || value
                        .as_str()
                        .map(|s| s.trim().parse::<i64>().is_ok())
                        .unwrap_or(false)
            }
            _ => false,
        }
    }
}

fn officer_and_amount(name: &'static str, description: &'static str) -> OptionDefinition {
    OptionDefinition::subcommand(name, description)
        .option(OptionDefinition::user("officer", "Target officer").required())
        .option(OptionDefinition::integer("amount", "Positive integer amount").required().min(1))
}

fn rank_change(name: &'static str, description: &'static str) -> OptionDefinition {
    OptionDefinition::subcommand(name, description)
        .option(OptionDefinition::user("officer", "Target user").required())
        .option(OptionDefinition::string("rank", "New rank label").required())
}

fn build_catalog() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("ping", "Check if Grant is alive"),
        CommandDefinition::new("echo", "Echo your input back")
            .option(OptionDefinition::string("input", "Text to echo").required()),
        CommandDefinition::new("marks", "Manage officer marks")
            .option(officer_and_amount("add", "Add marks"))
            .option(officer_and_amount("subtract", "Subtract marks"))
            .option(
                OptionDefinition::subcommand("get", "Get marks")
                    .option(OptionDefinition::user("officer", "Officer user")),
            ),
        CommandDefinition::new("officer", "Officer management")
            .option(
                OptionDefinition::subcommand("register", "Register an officer")
                    .option(OptionDefinition::user("user", "Target user (optional)")),
            )
            .option(
                OptionDefinition::subcommand("info", "Show officer info")
                    .option(OptionDefinition::user("officer", "Target user")),
            )
            .option(
                OptionDefinition::subcommand("remove", "Remove officer")
                    .option(OptionDefinition::user("officer", "Target user").required()),
            )
            .option(rank_change("promote", "Promote officer"))
            .option(rank_change("demote", "Demote officer"))
            .option(
                OptionDefinition::subcommand("blacklist", "Set blacklist status")
                    .option(OptionDefinition::user("officer", "Target user").required())
                    .option(
                        OptionDefinition::string("state", "on to blacklist, off to unblacklist")
                            .required()
                            .choice("on", "on")
                            .choice("off", "off"),
                    ),
            ),
        CommandDefinition::new("command", "Developer database maintenance commands")
            .option(
                OptionDefinition::subcommand("export", "Export officers as base64 JSON")
                    .option(
                        OptionDefinition::integer(
                            "limit",
                            "Number of rows to export (1-500, default 50)",
                        )
                        .min(1)
                        .max(EXPORT_LIMIT_MAX),
                    )
                    .option(
                        OptionDefinition::integer("offset", "Rows to skip (default 0)").min(0),
                    ),
            )
            .option(
                OptionDefinition::subcommand(
                    "import",
                    "Import officers from base64 JSON export payload",
                )
                .option(
                    OptionDefinition::string("payload", "Base64 string returned by /command export")
                        .required(),
                ),
            ),
    ]
}

/// The full command catalog
pub fn catalog() -> &'static [CommandDefinition] {
    static CATALOG: OnceLock<Vec<CommandDefinition>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// Look up a top-level command by name
pub fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    catalog().iter().find(|c| c.name == name)
}
