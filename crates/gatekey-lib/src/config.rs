// ============================
// crates/gatekey-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use serde::Deserialize;

use crate::credential::password::{HashCost, PasswordRequirements};
use crate::error::AuthError;
use crate::token::{SigningKey, TokenAlgorithm};

/// Default token TTL in seconds (1 hour)
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60;

/// Service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Signing key material, raw or base64. Has no default: a process
    /// without a key must not start.
    pub signing_key: String,
    /// Token signing algorithm
    pub algorithm: TokenAlgorithm,
    /// Token TTL in seconds
    pub token_ttl_secs: u64,
    /// Scrypt cost parameters
    pub hash_cost: HashCost,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
    /// Log level
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            algorithm: TokenAlgorithm::default(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            hash_cost: HashCost::default(),
            password_requirements: PasswordRequirements::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from config files and environment variables
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config.toml"))
                .merge(Yaml::file("config.yaml"))
                .merge(Json::file("config.json"))
                .merge(Env::prefixed("GATEKEY_")),
        )
    }

    /// Load settings from an explicit file, still honoring env overrides
    pub fn load_from(path: &str) -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(path))
                .merge(Env::prefixed("GATEKEY_")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Enforce startup invariants.
    ///
    /// Failing here aborts initialization: a service with no usable
    /// signing key or nonsensical hashing cost must not come up.
    pub fn validate(&self) -> Result<(), AuthError> {
        SigningKey::from_config(&self.signing_key)?;
        self.hash_cost.params()?;
        if self.token_ttl_secs == 0 {
            return Err(AuthError::Config("token_ttl_secs must be positive".to_string()));
        }
        Ok(())
    }
}
