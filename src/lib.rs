//! # GAIUS - client for GAIUS cognitive agents
//!
//! A GAIUS agent is a remote service made of named nodes. This crate lets one
//! caller treat the whole agent as a single endpoint while still addressing
//! individual nodes when needed.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! gaius = "0.3"  # Default: agent client + observability
//! ```
//!
//! ## Feature Flags
//!
//! - **`agent`** (default): the agent client ([`agent`])
//! - **`observability`** (default): logging initialization ([`observability`])
//! - **`file-logging`**: daily-rotated log files
//!
//! The configuration loader ([`config`]) is always available.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gaius::prelude::*;
//!
//! let config = gaius::config::load_config(None, None)?;
//! let mut client = AgentClient::from_config(&config)?;
//! client.connect()?;
//! client.set_ingress_nodes(&config.nodes.ingress)?;
//! client.set_query_nodes(&config.nodes.query)?;
//!
//! client.observe(&Observation::from_strings(["hello", "world"]))?;
//! client.learn()?;
//! let predictions = client.get_predictions()?;
//! ```

pub use gaius_config as config;

#[cfg(feature = "agent")]
pub use gaius_agent as agent;

#[cfg(feature = "observability")]
pub use gaius_observability as observability;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use gaius_config::{load_config, validate_config, GaiusConfig};

    #[cfg(feature = "agent")]
    pub use gaius_agent::{
        AgentClient, AgentClientError, AgentInfo, ConnectionError, Observation, Query,
        QueryError, QueryOutcome, ReconciledResult, Targets,
    };
}
