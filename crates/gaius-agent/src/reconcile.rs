// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Response reconciliation
//!
//! Turns the per-node results of one dispatch into the caller-facing shape.
//! The shape depends only on the number of targets and the summarize flag,
//! never on response content.

use crate::dispatch::{NodeStatus, RawNodeResult, UNIQUE_ID_FIELD};
use crate::error::QueryError;
use crate::nodes::NodeSet;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Flags that shape reconciled results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Unwrap the payload when exactly one node was targeted
    pub summarize_for_single_node: bool,
    /// Keep `unique_id` in payloads when a correlation id was supplied
    pub send_unique_ids: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            summarize_for_single_node: true,
            send_unique_ids: true,
        }
    }
}

/// Caller-facing result of a query
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciledResult {
    /// Payload of the only targeted node
    Single(Value),
    /// Payload per node name; a repeated name holds its last result
    ByNode(BTreeMap<String, Value>),
}

impl ReconciledResult {
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            ReconciledResult::Single(value) => Some(value),
            ReconciledResult::ByNode(_) => None,
        }
    }

    pub fn as_by_node(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            ReconciledResult::Single(_) => None,
            ReconciledResult::ByNode(map) => Some(map),
        }
    }

    /// Payload of `node` in a name-keyed result
    pub fn node(&self, node: &str) -> Option<&Value> {
        self.as_by_node().and_then(|map| map.get(node))
    }

    /// Collapse into a plain JSON value
    pub fn into_value(self) -> Value {
        match self {
            ReconciledResult::Single(value) => value,
            ReconciledResult::ByNode(map) => Value::Object(map.into_iter().collect::<Map<_, _>>()),
        }
    }
}

/// Result plus the echoed correlation id
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub result: ReconciledResult,
    /// The id supplied with the query, returned as is
    pub correlation_id: Option<String>,
}

impl QueryOutcome {
    pub fn into_result(self) -> ReconciledResult {
        self.result
    }
}

/// A node's payload: its `message` field, or the whole body when absent
fn payload_of(body: Value) -> Value {
    match body {
        Value::Object(mut fields) => match fields.remove("message") {
            Some(message) => message,
            None => Value::Object(fields),
        },
        other => other,
    }
}

fn strip_unique_id(payload: &mut Value) {
    if let Value::Object(fields) = payload {
        fields.remove(UNIQUE_ID_FIELD);
    }
}

/// Merge raw results for `targets` into the caller-facing outcome
///
/// Any node reporting a failure status fails the whole query.
pub fn reconcile(
    raw_results: Vec<RawNodeResult>,
    targets: &NodeSet,
    options: ReconcileOptions,
    correlation_id: Option<&str>,
) -> Result<QueryOutcome, QueryError> {
    if let Some(failed) = raw_results
        .iter()
        .find(|result| matches!(result.status, NodeStatus::Failed(_)))
    {
        let message = match &failed.status {
            NodeStatus::Failed(message) => message.clone(),
            NodeStatus::Okay => Value::Null,
        };
        warn!("[RECONCILE] node '{}' reported failure: {}", failed.node, message);
        return Err(QueryError::Remote {
            node: failed.node.clone(),
            message,
        });
    }

    let strip = correlation_id.is_some() && !options.send_unique_ids;
    let payloads = raw_results.into_iter().map(|result| {
        let mut payload = payload_of(result.body);
        if strip {
            strip_unique_id(&mut payload);
        }
        (result.node, payload)
    });

    let result = if targets.len() == 1 && options.summarize_for_single_node {
        let payload = payloads.last().map(|(_, payload)| payload).unwrap_or(Value::Null);
        ReconciledResult::Single(payload)
    } else {
        let mut by_node = BTreeMap::new();
        for (node, payload) in payloads {
            by_node.insert(node, payload);
        }
        ReconciledResult::ByNode(by_node)
    };

    Ok(QueryOutcome {
        result,
        correlation_id: correlation_id.map(str::to_string),
    })
}
