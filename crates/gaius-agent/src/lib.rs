// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! GAIUS Agent client - address every node of a remote agent as one endpoint
//!
//! A GAIUS agent exposes a set of named nodes behind one HTTP service. This
//! crate connects to the agent, indexes its genome, resolves node names, and
//! fans queries out to the selected nodes before merging their answers.
//!
//! # Quick Start
//!
//! ```ignore
//! use gaius_agent::{AgentClient, AgentInfo, Observation};
//!
//! let mut client = AgentClient::new(AgentInfo::new("api-key", "my-agent", "gaius.local", true))?;
//! client.connect()?;
//!
//! client.set_ingress_nodes(&["P1"])?;
//! client.set_query_nodes(&["P1"])?;
//!
//! client.observe(&Observation::from_strings(["hello"]))?;
//! client.learn()?;
//! let predictions = client.get_predictions()?;
//! ```
//!
//! # Architecture
//!
//! - **Session**: handshake, connection state and the current genome
//! - **Genome / nodes**: name → node id resolution
//! - **Dispatch**: one sequential HTTP call per target node
//! - **Reconcile**: per-node results → single payload or name-keyed map
//!
//! # Error Handling
//!
//! Every operation returns [`Result<T>`] over [`AgentClientError`], which is
//! either a [`ConnectionError`] (handshake, not connected) or a
//! [`QueryError`] (resolution, transport, remote failure). There are no
//! automatic retries.
//!
//! # Thread Safety
//!
//! The client is `Send`. Mutating operations take `&mut self`; wrap it in a
//! `Mutex` to share it between threads.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod genome;
pub mod nodes;
pub mod observation;
pub mod operations;
pub mod reconcile;
pub mod session;
pub mod transport;

pub use client::{AgentClient, ClientSettings, Query, Targets};
pub use dispatch::{NodeStatus, QueryDispatcher, QueryRequest, RawNodeResult};
pub use error::{AgentClientError, ConnectionError, QueryError, Result};
pub use genome::{GenomeIndex, NodeMetadata, NodeRole};
pub use nodes::{resolve_nodes, NodeDescriptor, NodeSet};
pub use observation::Observation;
pub use reconcile::{reconcile, QueryOutcome, ReconcileOptions, ReconciledResult};
pub use session::{AgentInfo, ConnectionState, HandshakeResult};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, HttpVerb, ReqwestTransport, TransportError,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
