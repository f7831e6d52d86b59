// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connection state machine
//!
//! `Disconnected` → `Connected`, driven only by [`ConnectionStateMachine::connect`].
//! Every connect re-runs the full handshake; failure always lands in
//! `Disconnected` with the previous genome dropped.

use crate::error::ConnectionError;
use crate::genome::GenomeIndex;
use crate::transport::{HttpRequest, HttpTransport, HttpVerb, API_KEY_HEADER};
use gaius_config::AgentConfig;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Path of the handshake endpoint, relative to the agent base URL
pub const CONNECT_PATH: &str = "connect";

/// Status value the agent uses for success
pub const STATUS_OKAY: &str = "okay";

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to reach one agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInfo {
    pub api_key: String,
    pub name: String,
    pub domain: String,
    pub secure: bool,
    /// Explicit base URL, used instead of `name` + `domain` when set
    pub url: Option<String>,
}

impl AgentInfo {
    pub fn new(
        api_key: impl Into<String>,
        name: impl Into<String>,
        domain: impl Into<String>,
        secure: bool,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            name: name.into(),
            domain: domain.into(),
            secure,
            url: None,
        }
    }

    /// Address an agent by explicit URL (local agents, containers, tests)
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Base URL, always terminated by `/`
    pub fn base_url(&self) -> String {
        let config: AgentConfig = self.into();
        config.base_url()
    }
}

impl From<&AgentConfig> for AgentInfo {
    fn from(config: &AgentConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            name: config.name.clone(),
            domain: config.domain.clone(),
            secure: config.secure,
            url: config.url.clone(),
        }
    }
}

impl From<&AgentInfo> for AgentConfig {
    fn from(info: &AgentInfo) -> Self {
        AgentConfig {
            api_key: info.api_key.clone(),
            name: info.name.clone(),
            domain: info.domain.clone(),
            secure: info.secure,
            url: info.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Connection flag, address, credentials and per-call timeout
#[derive(Debug, Clone)]
pub struct Session {
    state: ConnectionState,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl Session {
    pub fn new(info: &AgentInfo, timeout: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            base_url: info.base_url(),
            api_key: info.api_key.clone(),
            timeout,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// URL of `path` on node `node_id`
    pub fn node_url(&self, node_id: &str, path: &str) -> String {
        format!("{}{}/{}", self.base_url, node_id, path.trim_start_matches('/'))
    }
}

/// What a successful handshake hands back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct HandshakeResult {
    /// Connection status reported by the agent (`"okay"`)
    pub connection: String,
    /// Agent identity (`genie`, falling back to `agent_name` / `agent`)
    pub agent: Option<String>,
    /// The full handshake body
    pub body: Value,
}

/// Owns the session and the genome of the current connection
#[derive(Debug, Clone)]
pub struct ConnectionStateMachine {
    session: Session,
    genome: Option<GenomeIndex>,
}

impl ConnectionStateMachine {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            genome: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn state(&self) -> ConnectionState {
        self.session.state
    }

    /// Genome of the live connection, or `NotConnected`
    pub fn genome(&self) -> Result<&GenomeIndex, ConnectionError> {
        match (&self.session.state, &self.genome) {
            (ConnectionState::Connected, Some(genome)) => Ok(genome),
            _ => Err(ConnectionError::NotConnected),
        }
    }

    /// Gate for every post-connect operation
    pub fn require_connected(&self) -> Result<&Session, ConnectionError> {
        self.genome().map(|_| &self.session)
    }

    fn disconnect(&mut self) {
        self.session.state = ConnectionState::Disconnected;
        self.genome = None;
    }

    /// Run the handshake and, on success, install the new genome
    pub fn connect(
        &mut self,
        transport: &dyn HttpTransport,
    ) -> Result<HandshakeResult, ConnectionError> {
        let result = self.handshake(transport);
        match result {
            Ok((handshake, genome)) => {
                info!(
                    "[SESSION] Connected to {} ({} nodes)",
                    self.session.base_url,
                    genome.len()
                );
                self.genome = Some(genome);
                self.session.state = ConnectionState::Connected;
                Ok(handshake)
            }
            Err(e) => {
                warn!("[SESSION] Handshake with {} failed: {}", self.session.base_url, e);
                self.disconnect();
                Err(e)
            }
        }
    }

    fn handshake(
        &self,
        transport: &dyn HttpTransport,
    ) -> Result<(HandshakeResult, GenomeIndex), ConnectionError> {
        let url = format!("{}{}", self.session.base_url, CONNECT_PATH);
        debug!("[SESSION] Sending handshake to {}", url);

        let request = HttpRequest::new(HttpVerb::Get, url.clone(), self.session.timeout)
            .with_header(API_KEY_HEADER, self.session.api_key.clone());
        let response = transport
            .send(&request)
            .map_err(|e| ConnectionError::Transport {
                url,
                message: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(ConnectionError::Rejected {
                status: response.status,
                body: response.body,
            });
        }

        let body: Value = serde_json::from_str(&response.body)
            .map_err(|e| ConnectionError::InvalidResponse(e.to_string()))?;

        let status = body.get("status").and_then(Value::as_str).unwrap_or("");
        let connection = body.get("connection").and_then(Value::as_str);
        if status != STATUS_OKAY || connection.is_some_and(|c| c != STATUS_OKAY) {
            let reported = match connection {
                Some(c) if c != STATUS_OKAY => c,
                _ => status,
            }
            .to_string();
            return Err(ConnectionError::Refused {
                status: reported,
                body,
            });
        }

        let genome_value = body
            .get("genome")
            .ok_or_else(|| ConnectionError::InvalidGenome("handshake carries no genome".to_string()))?;
        let genome = GenomeIndex::from_value(genome_value)
            .map_err(|e| ConnectionError::InvalidGenome(e.to_string()))?;

        let agent = ["genie", "agent_name", "agent"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string);

        let handshake = HandshakeResult {
            connection: STATUS_OKAY.to_string(),
            agent,
            body,
        };
        Ok((handshake, genome))
    }
}
