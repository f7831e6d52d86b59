// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Agent Status Tool

Connects to a GAIUS agent described by `gaius_agent.toml`, applies the
configured node sets and prints the status of every node as JSON.

Usage:
  cargo run --bin agent_status -- [--config <gaius_agent.toml>] [--url <agent url>] [--nodes P1,P2] [--debug-all]

Example:
  GAIUS_API_KEY=secret cargo run --bin agent_status -- --url http://localhost:8000/ --nodes P1
*/

use anyhow::{bail, Context, Result};
use gaius::agent::{AgentClient, Query, Targets};
use gaius::config::{load_config, validate_config};
use gaius::observability::{
    debug_flags_help, init_logging, parse_debug_flags, CrateDebugFlags, LoggingConfig,
};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use tracing::info;

struct Args {
    config_path: Option<PathBuf>,
    overrides: HashMap<String, String>,
    nodes: Option<Vec<String>>,
    debug_flags: CrateDebugFlags,
}

fn parse_args() -> Result<Args> {
    let raw: Vec<String> = env::args().skip(1).collect();
    let mut args = Args {
        config_path: None,
        overrides: HashMap::new(),
        nodes: None,
        debug_flags: parse_debug_flags(),
    };

    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config_path = Some(PathBuf::from(path));
            }
            "--url" => {
                let url = iter.next().context("--url needs a value")?;
                args.overrides.insert("url".to_string(), url);
            }
            "--nodes" => {
                let list = iter.next().context("--nodes needs a comma separated list")?;
                args.nodes = Some(list.split(',').map(|n| n.trim().to_string()).collect());
            }
            "--help" | "-h" => {
                println!("Usage: agent_status [--config <path>] [--url <url>] [--nodes P1,P2]");
                println!("\n{}", debug_flags_help());
                std::process::exit(0);
            }
            flag if flag.starts_with("--debug-") => {}
            other => bail!("Unknown argument: {}", other),
        }
    }

    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let config = load_config(args.config_path.as_deref(), Some(&args.overrides))
        .context("Failed to load agent configuration")?;
    validate_config(&config).context("Invalid agent configuration")?;

    let mut logging = LoggingConfig::default().with_level(config.logging.level.clone());
    if let Some(dir) = &config.logging.log_dir {
        logging = logging.with_log_dir(dir);
    }
    let _guard = init_logging(&args.debug_flags, &logging)?;

    let mut client = AgentClient::from_config(&config)?;
    let handshake = client.connect()?;
    info!(
        "Connected to {} ({} nodes)",
        handshake.agent.as_deref().unwrap_or("agent"),
        client.genome()?.len()
    );

    if !config.nodes.ingress.is_empty() {
        client.set_ingress_nodes(&config.nodes.ingress)?;
    }
    if !config.nodes.query.is_empty() {
        client.set_query_nodes(&config.nodes.query)?;
    }

    let targets = match args.nodes {
        Some(names) => Targets::Named(names),
        None => Targets::AllNodes,
    };
    let outcome = client.query(Query::get("status").with_targets(targets))?;

    println!("{}", serde_json::to_string_pretty(&outcome.result.into_value())?);
    Ok(())
}
