//! Configuration validation
//!
//! Collects every problem in one pass so a misconfigured deployment sees all
//! of them at once.

use crate::{ConfigError, ConfigResult, GaiusConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Required agent fields (api key, and either `url` or `name` + `domain`)
/// - Positive, finite timeout
/// - Known log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &GaiusConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Run every check and return the individual failures
pub fn collect_errors(config: &GaiusConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_required_fields(config, &mut errors);
    validate_value_ranges(config, &mut errors);
    errors
}

fn validate_required_fields(config: &GaiusConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.agent.api_key.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "agent.api_key".to_string(),
        });
    }

    let has_url = config.agent.url.as_deref().is_some_and(|u| !u.is_empty());
    if !has_url {
        if config.agent.name.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: "agent.name".to_string(),
            });
        }
        if config.agent.domain.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: "agent.domain".to_string(),
            });
        }
    }
}

fn validate_value_ranges(config: &GaiusConfig, errors: &mut Vec<ConfigValidationError>) {
    if let Some(url) = config.agent.url.as_deref().filter(|u| !u.is_empty()) {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(ConfigValidationError::InvalidValue {
                field: "agent.url".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }
    }

    let timeout = config.client.timeout_secs;
    if !timeout.is_finite() || timeout <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "client.timeout_secs".to_string(),
            reason: "must be a positive number of seconds".to_string(),
        });
    }

    let level = config.logging.level.to_lowercase();
    if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: "must be one of trace, debug, info, warn, error".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GaiusConfig {
        let mut config = GaiusConfig::default();
        config.agent.api_key = "key".to_string();
        config.agent.name = "alpha".to_string();
        config.agent.domain = "example.com".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_url_replaces_name_and_domain() {
        let mut config = valid_config();
        config.agent.name.clear();
        config.agent.domain.clear();
        config.agent.url = Some("http://localhost:8000".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_default_config_reports_all_missing_fields() {
        let errors = collect_errors(&GaiusConfig::default());
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ConfigValidationError::MissingRequired {
            field: "agent.api_key".to_string()
        }));
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = valid_config();
        config.client.timeout_secs = 0.0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(msg)) if msg.contains("client.timeout_secs")));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = valid_config();
        config.agent.url = Some("ftp://agent".to_string());
        assert_eq!(collect_errors(&config).len(), 1);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = valid_config();
        config.logging.level = "WARNING".to_string();
        assert!(validate_config(&config).is_err());
    }
}
