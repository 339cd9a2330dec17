//! Vault configuration
//!
//! Chosen once at construction. Hosts typically embed it in their own config
//! file and hand the JSON fragment to [`VaultConfig::from_json`].

use custody_types::ids::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which ownership transfer variant the vault uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipMode {
    /// `transfer_ownership` hands over immediately
    Immediate,
    /// `transfer_ownership` stages a pending owner who must accept
    #[default]
    TwoStep,
}

/// Who may pause and unpause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseAuthority {
    /// Only the current owner
    Owner,
    /// Only holders of the pauser role
    PauserRole,
    /// The owner or any pauser role holder
    #[default]
    OwnerOrPauser,
}

/// Configuration for a [`crate::vault::Vault`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Ownership transfer variant (default: two-step).
    pub ownership: OwnershipMode,
    /// Pause authorization rule (default: owner or pauser role).
    pub pause_authority: PauseAuthority,
    /// Accounts granted the pauser role at construction.
    pub pausers: Vec<Address>,
}

impl VaultConfig {
    /// Create a config with defaults: two-step ownership, owner-or-pauser pause
    /// authority, no initial pausers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ownership(mut self, ownership: OwnershipMode) -> Self {
        self.ownership = ownership;
        self
    }

    pub fn with_pause_authority(mut self, authority: PauseAuthority) -> Self {
        self.pause_authority = authority;
        self
    }

    pub fn with_pauser(mut self, pauser: Address) -> Self {
        self.pausers.push(pauser);
        self
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pauser) = self.pausers.iter().find(|p| p.is_zero()) {
            return Err(ConfigError::InvalidPauser { pauser: *pauser });
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse vault config: {0}")]
    Parse(String),

    #[error("Invalid pauser: {pauser}")]
    InvalidPauser { pauser: Address },
}
