// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for GAIUS tools and applications
//!
//! Libraries only emit `tracing` events; binaries call [`init_logging`] once.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps background log writers alive; logs are flushed when dropped.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    filter: String,
}

impl LoggingGuard {
    /// The `EnvFilter` directives that were installed
    pub fn filter(&self) -> &str {
        &self.filter
    }
}

fn env_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

/// Install the global subscriber
///
/// Console output always; a daily-rotated `gaius.log` in `config.log_dir`
/// when the `file-logging` feature is enabled.
///
/// # Errors
///
/// Fails on invalid filter directives, an unusable log directory, or when a
/// global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&config.level);
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console_layer = match config.format {
        LogFormat::Full => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(env_filter(&filter)?)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_filter(env_filter(&filter)?)
            .boxed(),
    };
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let file_guard = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "gaius.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(env_filter(&filter)?)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    #[cfg(not(feature = "file-logging"))]
    if let Some(dir) = &config.log_dir {
        eprintln!(
            "Warning: log_dir {} ignored (built without the file-logging feature)",
            dir.display()
        );
    }

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guard: file_guard,
        filter,
    })
}

/// Initialize console logging at `info` with the given debug flags
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingConfig::default())
}
