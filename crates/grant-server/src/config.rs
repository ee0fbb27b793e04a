//! Runtime configuration
//!
//! All settings come from the process environment. `from_lookup` takes the
//! lookup as a closure so configuration can be exercised without touching
//! real environment variables.

use grant_core::roles::parse_id_list;
use grant_core::{DeveloperAllowList, GrantError, InteractionVerifier, RoleGate, TIER_HR, TIER_MR};
use std::env;
use thiserror::Error;

/// Hex public key of the application
pub const ENV_PUBLIC_KEY: &str = "DISCORD_PUBLIC_KEY";
/// Role ids satisfying the MR tier
pub const ENV_MR_ROLES: &str = "ROLE_IDS_MR_AND_HIGHER";
/// Role ids satisfying the HR tier
pub const ENV_HR_ROLES: &str = "ROLE_IDS_HR_AND_HIGHER";
/// User ids allowed to run developer commands
pub const ENV_DEVELOPERS: &str = "DEVELOPER_USER_IDS";
/// Postgres connection string
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Listen port
pub const ENV_PORT: &str = "GRANT_PORT";
/// Maximum log level
pub const ENV_LOG_LEVEL: &str = "GRANT_LOG_LEVEL";

const DEFAULT_PORT: u16 = 8080;

/// Configuration errors, all fatal at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(#[from] GrantError),

    #[error("Invalid port: {0}")]
    InvalidPort(String),
}

/// Loaded service configuration
#[derive(Debug, Clone)]
pub struct GrantConfig {
    pub verifier: InteractionVerifier,
    pub role_gate: RoleGate,
    pub developers: DeveloperAllowList,
    pub database_url: Option<String>,
    pub port: u16,
    pub log_level: String,
}

impl GrantConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let public_key = non_empty(ENV_PUBLIC_KEY).ok_or(ConfigError::Missing(ENV_PUBLIC_KEY))?;
        let verifier = InteractionVerifier::from_hex(&public_key)?;

        let role_gate = RoleGate::new()
            .with_tier(TIER_MR, parse_id_list(&lookup(ENV_MR_ROLES).unwrap_or_default()))
            .with_tier(TIER_HR, parse_id_list(&lookup(ENV_HR_ROLES).unwrap_or_default()));
        let developers = DeveloperAllowList::new(parse_id_list(
            &lookup(ENV_DEVELOPERS).unwrap_or_default(),
        ));

        let port = match non_empty(ENV_PORT) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            verifier,
            role_gate,
            developers,
            database_url: non_empty(ENV_DATABASE_URL),
            port,
            log_level: non_empty(ENV_LOG_LEVEL).unwrap_or_else(|| "info".into()),
        })
    }
}
