// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # GAIUS Configuration System
//!
//! Type-safe configuration loader for GAIUS agent clients with support for:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gaius_config::{load_config, GaiusConfig};
//!
//! // Load configuration with automatic file discovery and overrides
//! let config = load_config(None, None).expect("Failed to load config");
//!
//! println!("Agent: {}.{}", config.agent.name, config.agent.domain);
//! println!("Timeout: {}s", config.client.timeout_secs);
//! ```
//!
//! Precedence, lowest to highest: `gaius_agent.toml`, `GAIUS_*` environment
//! variables, explicit CLI overrides.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name searched for by [`find_config_file`]
pub const CONFIG_FILE_NAME: &str = "gaius_agent.toml";

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
