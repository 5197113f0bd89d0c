//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GATEHOUSE_DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `GATEHOUSE_ARGON2_M_COST` - Argon2 memory cost in KiB
//! - `GATEHOUSE_ARGON2_T_COST` - Argon2 iteration count
//! - `GATEHOUSE_ARGON2_P_COST` - Argon2 parallelism
//!
//! Unset cost variables fall back to the `argon2` crate defaults.

use secrecy::SecretString;
use thiserror::Error;

use crate::services::accounts::HasherConfig;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Account service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: SecretString,
    /// Argon2 work factor for the credential hasher
    pub hasher: HasherConfig,
}

impl ServiceConfig {
    /// Load the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `GATEHOUSE_DATABASE_URL` is unset or a
    /// cost override does not parse as an unsigned integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = require_env("GATEHOUSE_DATABASE_URL")?.into();

        let defaults = HasherConfig::default();
        let hasher = HasherConfig {
            m_cost: optional_u32("GATEHOUSE_ARGON2_M_COST", defaults.m_cost)?,
            t_cost: optional_u32("GATEHOUSE_ARGON2_T_COST", defaults.t_cost)?,
            p_cost: optional_u32("GATEHOUSE_ARGON2_P_COST", defaults.p_cost)?,
        };

        Ok(Self {
            database_url,
            hasher,
        })
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            ConfigError::InvalidEnvVar(name.to_owned(), "expected an unsigned integer".to_owned())
        }),
        Err(_) => Ok(default),
    }
}
