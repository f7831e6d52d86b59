// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! GAIUS agent client
//!
//! Ties the connection state machine, node resolution, dispatch and
//! reconciliation together behind one handle.

use crate::dispatch::{QueryDispatcher, QueryRequest};
use crate::error::{ConnectionError, Result};
use crate::genome::GenomeIndex;
use crate::nodes::{resolve_nodes, NodeSet};
use crate::reconcile::{reconcile, QueryOutcome, ReconcileOptions};
use crate::session::{
    AgentInfo, ConnectionState, ConnectionStateMachine, HandshakeResult, Session, DEFAULT_TIMEOUT,
};
use crate::transport::{HttpTransport, HttpVerb, ReqwestTransport};
use gaius_config::{ClientConfig, GaiusConfig};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-client behaviour flags
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientSettings {
    /// Bound on every individual HTTP call
    pub timeout: Duration,
    pub summarize_for_single_node: bool,
    pub send_unique_ids: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            summarize_for_single_node: true,
            send_unique_ids: true,
        }
    }
}

impl ClientSettings {
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            summarize_for_single_node: self.summarize_for_single_node,
            send_unique_ids: self.send_unique_ids,
        }
    }
}

impl From<&ClientConfig> for ClientSettings {
    fn from(config: &ClientConfig) -> Self {
        let timeout = Duration::try_from_secs_f64(config.timeout_secs)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or_else(|| {
                warn!(
                    "[CLIENT] Invalid timeout {}s in config, using {:?}",
                    config.timeout_secs, DEFAULT_TIMEOUT
                );
                DEFAULT_TIMEOUT
            });
        Self {
            timeout,
            summarize_for_single_node: config.summarize_for_single_node,
            send_unique_ids: config.send_unique_ids,
        }
    }
}

/// Which nodes a query is sent to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Targets {
    /// The stored query node set
    #[default]
    QueryNodes,
    /// The stored ingress node set
    IngressNodes,
    /// Every primitive node of the genome
    AllNodes,
    /// Explicit names, resolved at query time
    Named(Vec<String>),
}

/// A query before node resolution
///
/// ```ignore
/// let outcome = client.query(
///     Query::post("observe")
///         .with_payload(json!({ "strings": ["hello"] }))
///         .with_nodes(["P1", "P2"])
///         .with_correlation_id("req-42"),
/// )?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub verb: HttpVerb,
    pub path: String,
    pub payload: Option<Value>,
    pub targets: Targets,
    pub correlation_id: Option<String>,
}

impl Query {
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            payload: None,
            targets: Targets::default(),
            correlation_id: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpVerb::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpVerb::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpVerb::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpVerb::Delete, path)
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_targets(mut self, targets: Targets) -> Self {
        self.targets = targets;
        self
    }

    /// Target explicit node names
    pub fn with_nodes<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_targets(Targets::Named(names.into_iter().map(Into::into).collect()))
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }
}

/// Client for one remote GAIUS agent
///
/// Addresses the agent's nodes as a single endpoint: connect once, pick
/// ingress and query node sets, then issue queries that fan out to every
/// target node in turn.
///
/// The client is `Send` but every mutating operation takes `&mut self`; share
/// it across threads only behind a lock.
///
/// # Example
/// ```ignore
/// use gaius_agent::{AgentClient, AgentInfo};
///
/// let mut client = AgentClient::new(AgentInfo::new("key", "my-agent", "gaius.local", true))?;
/// client.connect()?;
/// client.set_ingress_nodes(&["P1"])?;
/// client.set_query_nodes(&["P1"])?;
/// let status = client.show_status()?;
/// ```
pub struct AgentClient {
    info: AgentInfo,
    connection: ConnectionStateMachine,
    settings: ClientSettings,
    ingress_nodes: NodeSet,
    query_nodes: NodeSet,
    transport: Box<dyn HttpTransport>,
}

impl AgentClient {
    /// Create a disconnected client using the blocking `reqwest` transport
    pub fn new(info: AgentInfo) -> Result<Self> {
        let transport =
            ReqwestTransport::new().map_err(|e| ConnectionError::TransportInit(e.to_string()))?;
        Ok(Self::with_transport(info, Box::new(transport)))
    }

    /// Create a disconnected client over any transport
    pub fn with_transport(info: AgentInfo, transport: Box<dyn HttpTransport>) -> Self {
        let settings = ClientSettings::default();
        let session = Session::new(&info, settings.timeout);
        Self {
            info,
            connection: ConnectionStateMachine::new(session),
            settings,
            ingress_nodes: NodeSet::new(),
            query_nodes: NodeSet::new(),
            transport,
        }
    }

    /// Create a client from a loaded configuration
    ///
    /// The `[nodes]` section is not applied here; node sets need a genome and
    /// therefore a connection.
    pub fn from_config(config: &GaiusConfig) -> Result<Self> {
        let client = Self::new(AgentInfo::from(&config.agent))?;
        Ok(client.with_settings(ClientSettings::from(&config.client)))
    }

    pub fn with_settings(mut self, settings: ClientSettings) -> Self {
        self.connection.session_mut().set_timeout(settings.timeout);
        self.settings = settings;
        self
    }

    pub fn info(&self) -> &AgentInfo {
        &self.info
    }

    // ========================================================================
    // Connection
    // ========================================================================

    /// Perform the handshake, replacing any previous connection
    ///
    /// Stored ingress and query node sets are cleared whatever the outcome.
    pub fn connect(&mut self) -> Result<HandshakeResult> {
        if !self.ingress_nodes.is_empty() || !self.query_nodes.is_empty() {
            warn!("[CLIENT] Reconnecting clears the ingress and query node sets");
        }
        self.ingress_nodes = NodeSet::new();
        self.query_nodes = NodeSet::new();

        let handshake = self.connection.connect(self.transport.as_ref())?;
        info!(
            "[CLIENT] Connected to agent {}",
            handshake.agent.as_deref().unwrap_or(&self.info.name)
        );
        Ok(handshake)
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.state() == ConnectionState::Connected
    }

    pub fn genome(&self) -> Result<&GenomeIndex> {
        Ok(self.connection.genome()?)
    }

    // ========================================================================
    // Node sets
    // ========================================================================

    /// Replace the ingress node set
    pub fn set_ingress_nodes<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let genome = self.connection.genome()?;
        self.ingress_nodes = resolve_nodes(genome, names)?;
        debug!("[CLIENT] Ingress nodes: {:?}", self.ingress_nodes.names().collect::<Vec<_>>());
        Ok(())
    }

    /// Replace the query node set
    pub fn set_query_nodes<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let genome = self.connection.genome()?;
        self.query_nodes = resolve_nodes(genome, names)?;
        debug!("[CLIENT] Query nodes: {:?}", self.query_nodes.names().collect::<Vec<_>>());
        Ok(())
    }

    pub fn ingress_nodes(&self) -> &NodeSet {
        &self.ingress_nodes
    }

    pub fn query_nodes(&self) -> &NodeSet {
        &self.query_nodes
    }

    /// Every primitive node of the connected genome
    pub fn all_nodes(&self) -> Result<&NodeSet> {
        Ok(self.connection.genome()?.all_nodes())
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.settings.timeout = timeout;
        self.connection.session_mut().set_timeout(timeout);
    }

    pub fn set_summarize_for_single_node(&mut self, summarize: bool) {
        self.settings.summarize_for_single_node = summarize;
    }

    pub fn set_send_unique_ids(&mut self, send: bool) {
        self.settings.send_unique_ids = send;
    }

    // ========================================================================
    // Querying
    // ========================================================================

    /// Resolve targets, call each node in order and reconcile the answers
    ///
    /// A failed query leaves the connection untouched.
    pub fn query(&self, query: Query) -> Result<QueryOutcome> {
        let session = self.connection.require_connected()?;
        let genome = self.connection.genome()?;

        let targets = match query.targets {
            Targets::QueryNodes => self.query_nodes.clone(),
            Targets::IngressNodes => self.ingress_nodes.clone(),
            Targets::AllNodes => genome.all_nodes().clone(),
            Targets::Named(names) => resolve_nodes(genome, &names)?,
        };

        let request = QueryRequest {
            verb: query.verb,
            path: query.path,
            payload: query.payload,
            targets,
            correlation_id: query.correlation_id,
        };

        let raw = QueryDispatcher::new(self.transport.as_ref(), session).dispatch(&request)?;
        let outcome = reconcile(
            raw,
            &request.targets,
            self.settings.reconcile_options(),
            request.correlation_id.as_deref(),
        )?;
        Ok(outcome)
    }
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("base_url", &self.connection.session().base_url())
            .field("state", &self.connection.state())
            .field("settings", &self.settings)
            .field("ingress_nodes", &self.ingress_nodes)
            .field("query_nodes", &self.query_nodes)
            .finish()
    }
}
