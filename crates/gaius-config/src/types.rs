// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `gaius_agent.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GaiusConfig {
    pub agent: AgentConfig,
    pub client: ClientConfig,
    pub nodes: NodesConfig,
    pub logging: LoggingConfig,
}

/// Remote agent identity and credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// API key sent with the handshake and every node call
    pub api_key: String,
    /// Agent name; first label of the agent host name
    pub name: String,
    /// Domain the agent is served under
    pub domain: String,
    /// Use https instead of http
    pub secure: bool,
    /// Explicit base URL; takes precedence over `name`/`domain` when set
    pub url: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            name: String::new(),
            domain: String::new(),
            secure: true,
            url: None,
        }
    }
}

/// Query behaviour of the client
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-call timeout in seconds
    pub timeout_secs: f64,
    /// Unwrap single-node responses instead of returning a name-keyed map
    pub summarize_for_single_node: bool,
    /// Keep correlation ids (`unique_id`) in returned payloads
    pub send_unique_ids: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10.0,
            summarize_for_single_node: true,
            send_unique_ids: true,
        }
    }
}

/// Node names applied right after a successful connect
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NodesConfig {
    pub ingress: Vec<String>,
    pub query: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for all crates (trace, debug, info, warn, error)
    pub level: String,
    /// Optional directory for log files
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl AgentConfig {
    /// Base URL of the agent, always terminated by `/`
    ///
    /// `url` wins when set; otherwise `{scheme}://{name}.{domain}/`.
    pub fn base_url(&self) -> String {
        let raw = match &self.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => {
                let scheme = if self.secure { "https" } else { "http" };
                format!("{}://{}.{}", scheme, self.name, self.domain)
            }
        };
        if raw.ends_with('/') {
            raw
        } else {
            format!("{}/", raw)
        }
    }
}
