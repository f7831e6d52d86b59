//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-gaius-agent`, `--debug-gaius-config`, etc.
//! to raise the log level per crate.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use gaius_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-gaius-agent".to_string()]);
/// assert!(flags.is_enabled("gaius-agent"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Looks for arguments matching `--debug-{crate-name}`.
    /// `--debug-all` enables every known crate.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }
            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enabled_crates.insert(crate_name.to_string());
            }
        }

        flags
    }

    fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Returns `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Create an `EnvFilter` directive string from debug flags
    ///
    /// Format: `"gaius_agent=debug,info"`, or just `default_level` if no crate is enabled.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_target(crate_name)))
            .collect();
        filters.push(default_level.to_lowercase());
        filters.join(",")
    }
}

/// Parse debug flags from both command-line arguments and `GAIUS_DEBUG`
///
/// Environment variable format: comma-separated crate names, e.g. `"gaius-agent,gaius-config"`,
/// or `"all"`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());

    if let Ok(env_var) = env::var("GAIUS_DEBUG") {
        if env_var == "all" {
            flags.enable_all();
        } else {
            for crate_name in env_var.split(',') {
                let crate_name = crate_name.trim();
                if !crate_name.is_empty() {
                    flags.enabled_crates.insert(crate_name.to_string());
                }
            }
        }
    }

    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  GAIUS_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  GAIUS_DEBUG=all                                Enable debug for all crates
"#,
        KNOWN_CRATES.join(", ")
    )
}
