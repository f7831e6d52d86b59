// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # gaius-observability
//!
//! Logging setup shared by every GAIUS crate and tool, with per-crate debug
//! flag support.
//!
//! ## Features
//! - `file-logging`: daily-rotated log files in addition to console output

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known GAIUS crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "gaius",
    "gaius-agent",
    "gaius-config",
    "gaius-observability",
];

/// Tracing target for a crate name (`gaius-agent` -> `gaius_agent`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
