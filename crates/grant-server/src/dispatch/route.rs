//! Command routing table
//!
//! Every accepted (command, subcommand) pair maps to one `Route`, and every
//! route declares the access check the dispatcher runs before its handler.

use grant_core::schema::{find_command, OptionDefinition};
use grant_core::{TIER_HR, TIER_MR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarksCommand {
    Add,
    Subtract,
    Get,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficerCommand {
    Register,
    Info,
    Remove,
    Promote,
    Demote,
    Blacklist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeveloperCommand {
    Export,
    Import,
}

/// A resolved command invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Ping,
    Echo,
    Marks(MarksCommand),
    Officer(OfficerCommand),
    Developer(DeveloperCommand),
}

/// Authorization required before a route's handler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No check
    Open,
    /// Caller must satisfy the tier
    Tier(&'static str),
    /// Caller acting on themself passes; otherwise the tier applies.
    /// Checked by the handler once the target is resolved.
    SelfOrTier(&'static str),
    /// Caller must be on the developer allow-list
    Developer,
}

/// Why an invocation has no route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    UnknownCommand,
    /// Known command family, unknown subcommand
    UnknownSubcommand(&'static str),
}

/// Commands without subcommands
const LEAF_ROUTES: &[(&str, Route)] = &[("ping", Route::Ping), ("echo", Route::Echo)];

const SUBCOMMAND_ROUTES: &[(&str, &str, Route)] = &[
    ("marks", "add", Route::Marks(MarksCommand::Add)),
    ("marks", "subtract", Route::Marks(MarksCommand::Subtract)),
    ("marks", "get", Route::Marks(MarksCommand::Get)),
    ("officer", "register", Route::Officer(OfficerCommand::Register)),
    ("officer", "info", Route::Officer(OfficerCommand::Info)),
    ("officer", "remove", Route::Officer(OfficerCommand::Remove)),
    ("officer", "promote", Route::Officer(OfficerCommand::Promote)),
    ("officer", "demote", Route::Officer(OfficerCommand::Demote)),
    ("officer", "blacklist", Route::Officer(OfficerCommand::Blacklist)),
    ("command", "export", Route::Developer(DeveloperCommand::Export)),
    ("command", "import", Route::Developer(DeveloperCommand::Import)),
];

const FAMILIES: &[&str] = &["marks", "officer", "command"];

impl Route {
    /// Look up the route for a command and (possibly empty) subcommand name
    pub fn resolve(command: &str, subcommand: &str) -> Result<Self, RouteError> {
        if let Some((_, route)) = LEAF_ROUTES.iter().find(|(name, _)| *name == command) {
            return Ok(*route);
        }

        if let Some((_, _, route)) = SUBCOMMAND_ROUTES
            .iter()
            .find(|(name, sub, _)| *name == command && *sub == subcommand)
        {
            return Ok(*route);
        }

        match FAMILIES.iter().find(|family| **family == command) {
            Some(family) => Err(RouteError::UnknownSubcommand(*family)),
            None => Err(RouteError::UnknownCommand),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Ping | Route::Echo => Access::Open,
            Route::Marks(_) => Access::Tier(TIER_MR),
            Route::Officer(OfficerCommand::Register | OfficerCommand::Info) => {
                Access::SelfOrTier(TIER_HR)
            }
            Route::Officer(_) => Access::Tier(TIER_HR),
            Route::Developer(_) => Access::Developer,
        }
    }

    pub fn command_name(&self) -> &'static str {
        match self {
            Route::Ping => "ping",
            Route::Echo => "echo",
            Route::Marks(_) => "marks",
            Route::Officer(_) => "officer",
            Route::Developer(_) => "command",
        }
    }

    pub fn subcommand_name(&self) -> Option<&'static str> {
        SUBCOMMAND_ROUTES
            .iter()
            .find(|(_, _, route)| route == self)
            .map(|(_, sub, _)| *sub)
    }

    /// Options the schema declares for this route
    pub fn declared_options(&self) -> Vec<&'static OptionDefinition> {
        let Some(command) = find_command(self.command_name()) else {
            return Vec::new();
        };

        match self.subcommand_name() {
            Some(sub) => command
                .subcommand(sub)
                .map(|s| s.options.iter().collect())
                .unwrap_or_default(),
            None => command.value_options().collect(),
        }
    }

    /// Every routable pair
    pub fn all() -> impl Iterator<Item = Route> {
        LEAF_ROUTES
            .iter()
            .map(|(_, r)| *r)
            .chain(SUBCOMMAND_ROUTES.iter().map(|(_, _, r)| *r))
    }
}
