//! Role gate and developer allow-list
//!
//! Tiers are flat: each tier maps to the full set of role ids that satisfy
//! it. A hierarchy is expressed by listing higher-tier roles in the lower
//! tier's set when the policy is loaded.

use std::collections::{HashMap, HashSet};

/// Middle-rank tier
pub const TIER_MR: &str = "MR";

/// High-rank tier
pub const TIER_HR: &str = "HR";

/// Tier name to eligible role ids
#[derive(Debug, Clone, Default)]
pub struct RoleGate {
    tiers: HashMap<String, HashSet<String>>,
}

impl RoleGate {
    /// Create a gate with no configured tiers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the eligible role set for a tier
    pub fn with_tier<I, S>(mut self, tier: impl Into<String>, role_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tiers
            .insert(tier.into(), role_ids.into_iter().map(Into::into).collect());
        self
    }

    /// True iff the caller holds at least one role eligible for `tier`.
    ///
    /// Unknown tiers have no eligible roles and always fail.
    pub fn is_at_least(&self, role_ids: &[String], tier: &str) -> bool {
        match self.tiers.get(tier) {
            Some(eligible) => role_ids.iter().any(|role| eligible.contains(role)),
            None => false,
        }
    }

    /// Number of role ids configured for a tier
    pub fn tier_size(&self, tier: &str) -> usize {
        self.tiers.get(tier).map(HashSet::len).unwrap_or(0)
    }
}

/// User ids allowed to run developer maintenance commands
#[derive(Debug, Clone, Default)]
pub struct DeveloperAllowList {
    ids: HashSet<String>,
}

impl DeveloperAllowList {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Empty user ids never match
    pub fn contains(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.ids.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Split a comma-separated id list, trimming entries and dropping blanks
pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}
