//! Interaction dispatcher
//!
//! Routes a verified interaction to its command handler:
//!
//! 1. Handshakes are acknowledged without touching the roster
//! 2. The (command, subcommand) pair is looked up in the route table
//! 3. Options are bound against the command schema
//! 4. The route's access check runs before any store access
//! 5. The handler reads/writes the roster and builds the reply
//!
//! Validation, permission and not-found outcomes are ordinary replies.
//! Only store and encoding faults escape as `DispatchError`.

mod developer;
mod marks;
mod officer;
pub mod route;

pub use route::{Access, DeveloperCommand, MarksCommand, OfficerCommand, Route, RouteError};

use grant_core::{
    DeveloperAllowList, Interaction, InteractionResponse, InteractionType, OptionMap, RoleGate,
    User,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{RosterStore, StorageError};

/// Faults that escape a command handler
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// One command invocation, with options bound for its route
pub(crate) struct Invocation<'a> {
    pub interaction: &'a Interaction,
    pub caller: User,
    pub options: OptionMap,
}

impl<'a> Invocation<'a> {
    fn new(interaction: &'a Interaction, route: Route) -> Self {
        let supplied = match route.subcommand_name() {
            Some(_) => interaction.subcommand_options(),
            None => interaction.data.options.as_slice(),
        };

        Self {
            interaction,
            caller: interaction.caller(),
            options: OptionMap::bind(route.declared_options(), supplied),
        }
    }

    /// User named by a user option, if it resolves
    pub fn target(&self, option: &str) -> Option<&'a User> {
        self.interaction.resolve_user(self.options.string(option))
    }

    pub fn roles(&self) -> &'a [String] {
        self.interaction.caller_roles()
    }
}

pub(crate) fn denied_for_tier(tier: &str) -> InteractionResponse {
    InteractionResponse::message(format!("Permission denied: {} or higher required.", tier))
}

pub(crate) fn officer_not_found() -> InteractionResponse {
    InteractionResponse::message("Officer not found.")
}

/// Dispatches interactions against the roster
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: Arc<dyn RosterStore>,
    gate: RoleGate,
    developers: DeveloperAllowList,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn RosterStore>, gate: RoleGate, developers: DeveloperAllowList) -> Self {
        Self {
            store,
            gate,
            developers,
        }
    }

    pub fn store(&self) -> &Arc<dyn RosterStore> {
        &self.store
    }

    /// Handle one interaction and build its reply
    pub async fn dispatch(
        &self,
        interaction: &Interaction,
    ) -> Result<InteractionResponse, DispatchError> {
        match interaction.interaction_type() {
            InteractionType::Ping => return Ok(InteractionResponse::pong()),
            InteractionType::Other(kind) => {
                debug!(kind = ?kind, "Unsupported interaction type");
                return Ok(InteractionResponse::message("Unsupported interaction type."));
            }
            InteractionType::ApplicationCommand => {}
        }

        let route = match Route::resolve(&interaction.data.name, interaction.subcommand_name()) {
            Ok(route) => route,
            Err(RouteError::UnknownCommand) => {
                debug!(command = %interaction.data.name, "Unknown command");
                return Ok(InteractionResponse::message("Unknown command."));
            }
            Err(RouteError::UnknownSubcommand(family)) => {
                return Ok(InteractionResponse::message(format!(
                    "Unknown {} subcommand.",
                    family
                )));
            }
        };

        let invocation = Invocation::new(interaction, route);

        if let Some(denied) = self.authorize(route, &invocation) {
            return Ok(denied);
        }

        match route {
            Route::Ping => Ok(InteractionResponse::message("Pong!")),
            Route::Echo => Ok(InteractionResponse::message(
                invocation.options.string("input").unwrap_or(""),
            )),
            Route::Marks(MarksCommand::Get) => self.marks_get(&invocation).await,
            Route::Marks(MarksCommand::Add) => {
                self.marks_adjust(&invocation, grant_core::MarksAdjustment::Add).await
            }
            Route::Marks(MarksCommand::Subtract) => {
                self.marks_adjust(&invocation, grant_core::MarksAdjustment::Subtract).await
            }
            Route::Officer(OfficerCommand::Register) => self.officer_register(&invocation).await,
            Route::Officer(OfficerCommand::Info) => self.officer_info(&invocation).await,
            Route::Officer(OfficerCommand::Remove) => self.officer_remove(&invocation).await,
            Route::Officer(OfficerCommand::Promote) => {
                self.officer_rank(&invocation, grant_core::AuditAction::Promote).await
            }
            Route::Officer(OfficerCommand::Demote) => {
                self.officer_rank(&invocation, grant_core::AuditAction::Demote).await
            }
            Route::Officer(OfficerCommand::Blacklist) => self.officer_blacklist(&invocation).await,
            Route::Developer(DeveloperCommand::Export) => self.developer_export(&invocation).await,
            Route::Developer(DeveloperCommand::Import) => self.developer_import(&invocation).await,
        }
    }

    /// Run the route's up-front access check; `Some` is the denial reply
    fn authorize(&self, route: Route, invocation: &Invocation<'_>) -> Option<InteractionResponse> {
        match route.access() {
            Access::Open | Access::SelfOrTier(_) => None,
            Access::Tier(tier) => {
                if self.gate.is_at_least(invocation.roles(), tier) {
                    None
                } else {
                    warn!(caller = %invocation.caller.id, route = ?route, tier = tier, "Permission denied");
                    Some(denied_for_tier(tier))
                }
            }
            Access::Developer => {
                if self.developers.contains(&invocation.caller.id) {
                    None
                } else {
                    warn!(caller = %invocation.caller.id, route = ?route, "Developer command denied");
                    Some(InteractionResponse::message(
                        "Permission denied: developer only command.",
                    ))
                }
            }
        }
    }

    /// Whether the caller satisfies `tier`
    pub(crate) fn caller_is_at_least(&self, invocation: &Invocation<'_>, tier: &str) -> bool {
        self.gate.is_at_least(invocation.roles(), tier)
    }
}
