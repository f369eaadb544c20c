//! Configuration management for armature applications
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use armature::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Application: {}", config.app.name);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `ARMATURE__<section>__<key>`
//!
//! Examples:
//! - `ARMATURE__APP__NAME=billing`
//! - `ARMATURE__SECURITY__HASHING__ROUNDS=8192`
//!
//! Secrets (the token signing key) are only read from the environment
//! (`ARMATURE_TOKEN_KEY`), never from configuration files.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/armature.toml`.
//! This can be overridden using the `ARMATURE_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

// Re-export public types
pub use models::{
    AdminConfig, AppConfig, AuditConfig, Config, HashingConfig, LoggingConfig, SecurityConfig,
    TokenConfig, ValidatorConfig,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`ARMATURE__*`)
    /// 2. TOML file (default: `config/armature.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (bad timezone, zero rounds, weak key, etc.)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate an already-built configuration
    ///
    /// `load`/`load_from_path` run this automatically; configurations built
    /// or mutated in code must pass through it before use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)?;
        Ok(())
    }
}
