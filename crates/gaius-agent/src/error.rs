// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the GAIUS agent client
//!
//! Two families: [`ConnectionError`] for the handshake and session gate, and
//! [`QueryError`] for everything that happens after a successful connect.

use serde_json::Value;

/// Result type alias using AgentClientError
pub type Result<T> = std::result::Result<T, AgentClientError>;

/// Handshake and session failures
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Operation attempted before a successful `connect()`
    #[error("Not connected to agent - call connect() first")]
    NotConnected,

    /// The handshake request never produced an HTTP response
    #[error("Handshake with {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The agent answered the handshake with a non-success HTTP status
    #[error("Handshake rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// HTTP success, but the body reports a failed connection
    #[error("Agent refused connection (status '{status}'): {body}")]
    Refused { status: String, body: Value },

    /// The handshake body is not the expected JSON document
    #[error("Invalid handshake response: {0}")]
    InvalidResponse(String),

    /// The genome in the handshake cannot be indexed
    #[error("Invalid genome: {0}")]
    InvalidGenome(String),

    /// The HTTP client could not be constructed
    #[error("Transport initialization failed: {0}")]
    TransportInit(String),
}

/// Failures of node resolution, dispatch and reconciliation
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The resolved target set is empty
    #[error("No nodes specified for query")]
    NoNodesSpecified,

    /// A node name is absent from the genome
    #[error("Unknown node '{name}'")]
    UnknownNode { name: String },

    /// The call to a node never produced an HTTP response
    #[error("Request to node '{node}' failed: {message}")]
    Transport { node: String, message: String },

    /// The call to a node exceeded the configured timeout
    #[error("Request to node '{node}' timed out after {timeout_secs:.3}s")]
    Timeout { node: String, timeout_secs: f64 },

    /// The node answered with a non-2xx HTTP status
    #[error("Node '{node}' returned HTTP {status}: {body}")]
    HttpStatus {
        node: String,
        status: u16,
        body: String,
    },

    /// The node's body is not JSON
    #[error("Node '{node}' returned an undecodable body: {message}")]
    InvalidResponse { node: String, message: String },

    /// The node's body reports a failure
    #[error("Node '{node}' reported failure: {message}")]
    Remote { node: String, message: Value },

    /// Caller-supplied data rejected before any network call
    #[error("Invalid request data: {0}")]
    InvalidData(String),
}

impl QueryError {
    /// True for failures caused by an unknown node name
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, QueryError::UnknownNode { .. })
    }

    /// Node the failure is attributed to, when there is one
    pub fn node(&self) -> Option<&str> {
        match self {
            QueryError::UnknownNode { name } => Some(name),
            QueryError::Transport { node, .. }
            | QueryError::Timeout { node, .. }
            | QueryError::HttpStatus { node, .. }
            | QueryError::InvalidResponse { node, .. }
            | QueryError::Remote { node, .. } => Some(node),
            QueryError::NoNodesSpecified | QueryError::InvalidData(_) => None,
        }
    }
}

/// Top-level error returned by [`crate::AgentClient`] operations
#[derive(Debug, thiserror::Error)]
pub enum AgentClientError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl AgentClientError {
    pub fn is_connection_error(&self) -> bool {
        matches!(self, AgentClientError::Connection(_))
    }

    pub fn is_query_error(&self) -> bool {
        matches!(self, AgentClientError::Query(_))
    }

    pub fn is_resolution_error(&self) -> bool {
        matches!(self, AgentClientError::Query(e) if e.is_resolution_error())
    }
}
