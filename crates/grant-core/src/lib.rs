//! # Grant Core
//!
//! Transport-free building blocks for the Grant guild-management bot:
//!
//! - **Signature verification**: Ed25519 over `timestamp || body`
//! - **Role gate**: flat tier → role-id policy and the developer allow-list
//! - **Interaction model**: the inbound envelope, typed option access and replies
//! - **Command schema**: the catalog published to the chat platform
//! - **Roster types**: officer rows, mark arithmetic, audit vocabulary
//! - **Transfer**: the base64 JSON export/import format

pub mod crypto;
pub mod error;
pub mod interaction;
pub mod roles;
pub mod roster;
pub mod schema;
pub mod transfer;

pub use crypto::{verify_signature, InteractionVerifier};
pub use error::{GrantError, Result};
pub use interaction::{Interaction, InteractionResponse, InteractionType, OptionMap, User};
pub use roles::{DeveloperAllowList, RoleGate, TIER_HR, TIER_MR};
pub use roster::{AuditAction, MarksAdjustment, OfficerRow};
pub use transfer::{ExportEnvelope, ImportBatch, Pagination};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
