// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Configuration is assembled in three tiers:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, GaiusConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the GAIUS agent configuration file
///
/// Search order:
/// 1. `GAIUS_CONFIG_PATH` environment variable
/// 2. Current working directory: `./gaius_agent.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("GAIUS_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by GAIUS_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet GAIUS_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is left to [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<GaiusConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: GaiusConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `GAIUS_API_KEY` -> `agent.api_key`
/// - `GAIUS_AGENT_NAME` -> `agent.name`
/// - `GAIUS_DOMAIN` -> `agent.domain`
/// - `GAIUS_SECURE` -> `agent.secure`
/// - `GAIUS_AGENT_URL` -> `agent.url`
/// - `GAIUS_TIMEOUT` -> `client.timeout_secs`
/// - `GAIUS_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut GaiusConfig) {
    if let Ok(value) = env::var("GAIUS_API_KEY") {
        config.agent.api_key = value;
    }
    if let Ok(value) = env::var("GAIUS_AGENT_NAME") {
        config.agent.name = value;
    }
    if let Ok(value) = env::var("GAIUS_DOMAIN") {
        config.agent.domain = value;
    }
    if let Ok(value) = env::var("GAIUS_SECURE") {
        config.agent.secure = parse_flag(&value);
    }
    if let Ok(value) = env::var("GAIUS_AGENT_URL") {
        config.agent.url = Some(value);
    }
    if let Ok(value) = env::var("GAIUS_TIMEOUT") {
        if let Ok(secs) = value.parse::<f64>() {
            config.client.timeout_secs = secs;
        }
    }
    if let Ok(value) = env::var("GAIUS_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"name": "alpha", "timeout": "5"}`)
pub fn apply_cli_overrides(config: &mut GaiusConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("api_key") {
        config.agent.api_key = value.clone();
    }
    if let Some(value) = cli_args.get("name") {
        config.agent.name = value.clone();
    }
    if let Some(value) = cli_args.get("domain") {
        config.agent.domain = value.clone();
    }
    if let Some(value) = cli_args.get("secure") {
        config.agent.secure = parse_flag(value);
    }
    if let Some(value) = cli_args.get("url") {
        config.agent.url = Some(value.clone());
    }
    if let Some(value) = cli_args.get("timeout") {
        if let Ok(secs) = value.parse::<f64>() {
            config.client.timeout_secs = secs;
        }
    }
    if let Some(value) = cli_args.get("summarize_for_single_node") {
        config.client.summarize_for_single_node = parse_flag(value);
    }
    if let Some(value) = cli_args.get("send_unique_ids") {
        config.client.send_unique_ids = parse_flag(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_agent.toml");
        File::create(&config_path).unwrap();

        env::set_var("GAIUS_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("GAIUS_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("does_not_exist.toml");

        env::set_var("GAIUS_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("GAIUS_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::remove_var("GAIUS_AGENT_NAME");
        env::remove_var("GAIUS_TIMEOUT");
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[agent]").unwrap();
        writeln!(file, "name = \"alpha\"").unwrap();
        writeln!(file, "domain = \"agents.example.com\"").unwrap();
        writeln!(file, "[client]").unwrap();
        writeln!(file, "timeout_secs = 2.5").unwrap();
        writeln!(file, "[nodes]").unwrap();
        writeln!(file, "query = [\"P1\", \"P2\"]").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.agent.name, "alpha");
        assert_eq!(config.client.timeout_secs, 2.5);
        assert_eq!(config.nodes.query, vec!["P1".to_string(), "P2".to_string()]);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[agent").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = GaiusConfig::default();

        env::set_var("GAIUS_API_KEY", "env-key");
        env::set_var("GAIUS_SECURE", "false");
        env::set_var("GAIUS_TIMEOUT", "7.5");

        apply_environment_overrides(&mut config);

        env::remove_var("GAIUS_API_KEY");
        env::remove_var("GAIUS_SECURE");
        env::remove_var("GAIUS_TIMEOUT");

        assert_eq!(config.agent.api_key, "env-key");
        assert!(!config.agent.secure);
        assert_eq!(config.client.timeout_secs, 7.5);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = GaiusConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("url".to_string(), "http://localhost:8000".to_string());
        cli_args.insert("summarize_for_single_node".to_string(), "no".to_string());
        cli_args.insert("timeout".to_string(), "not-a-number".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.agent.url.as_deref(), Some("http://localhost:8000"));
        assert!(!config.client.summarize_for_single_node);
        assert_eq!(config.client.timeout_secs, 10.0);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[agent]").unwrap();
        writeln!(file, "name = \"file-name\"").unwrap();
        writeln!(file, "domain = \"file-domain\"").unwrap();

        env::set_var("GAIUS_AGENT_NAME", "env-name");
        env::set_var("GAIUS_DOMAIN", "env-domain");

        let mut cli_args = HashMap::new();
        cli_args.insert("name".to_string(), "cli-name".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("GAIUS_AGENT_NAME");
        env::remove_var("GAIUS_DOMAIN");

        // CLI wins for name, env wins for domain (no CLI override)
        assert_eq!(config.agent.name, "cli-name");
        assert_eq!(config.agent.domain, "env-domain");
    }
}
