// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Genome index: node name → id, role and metadata
//!
//! The handshake returns the agent's genome. Only the parts needed for
//! routing are read here: the primitive and manipulative name maps and the
//! per-node metadata. The index is immutable once built and is replaced
//! wholesale on every successful handshake.
//!
//! When a name appears in both maps the manipulative entry wins.

use crate::nodes::{NodeDescriptor, NodeSet};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Which genome map a node was resolved through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Primitive,
    Manipulative,
}

/// Per-node metadata carried by the genome
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeMetadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genes: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GenomeElements {
    #[serde(default)]
    nodes: Vec<Value>,
}

/// Parsed genome as delivered in the handshake's `genome` field
///
/// Metadata entries stay raw until indexing; only those referenced by a name
/// map have to be well formed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenomeDocument {
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub primitive_map: BTreeMap<String, String>,
    #[serde(default)]
    pub manipulative_map: BTreeMap<String, String>,
    /// Metadata keyed by node id
    #[serde(default)]
    pub nodes: BTreeMap<String, Value>,
    #[serde(default)]
    elements: GenomeElements,
}

/// Reasons a genome cannot be indexed
#[derive(Debug, thiserror::Error)]
pub enum GenomeError {
    #[error("genome document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("node '{name}' maps to id '{id}' which has no metadata")]
    MissingMetadata { name: String, id: String },

    #[error("metadata of node id '{id}' is malformed: {message}")]
    InvalidMetadata { id: String, message: String },
}

#[derive(Debug, Clone)]
struct IndexEntry {
    id: String,
    role: NodeRole,
}

/// Immutable name → node lookup built once per connection
#[derive(Debug, Clone)]
pub struct GenomeIndex {
    agent: Option<String>,
    entries: HashMap<String, IndexEntry>,
    primitives: NodeSet,
    metadata: HashMap<String, NodeMetadata>,
}

impl GenomeIndex {
    /// Build from the raw `genome` JSON value of a handshake
    pub fn from_value(genome: &Value) -> Result<Self, GenomeError> {
        let document = GenomeDocument::deserialize(genome)?;
        Self::build(document)
    }

    /// Build from an already parsed genome document
    ///
    /// Metadata is taken from the id-keyed `nodes` object first, then from
    /// `elements.nodes[].data` for ids not already known.
    pub fn build(document: GenomeDocument) -> Result<Self, GenomeError> {
        let mut entries = HashMap::new();
        for (name, id) in &document.primitive_map {
            entries.insert(
                name.clone(),
                IndexEntry {
                    id: id.clone(),
                    role: NodeRole::Primitive,
                },
            );
        }
        for (name, id) in &document.manipulative_map {
            entries.insert(
                name.clone(),
                IndexEntry {
                    id: id.clone(),
                    role: NodeRole::Manipulative,
                },
            );
        }

        let mapped_ids: HashSet<&str> = document
            .primitive_map
            .values()
            .chain(document.manipulative_map.values())
            .map(String::as_str)
            .collect();

        let mut raw: Vec<(String, Value)> = document.nodes.into_iter().collect();
        for element in document.elements.nodes {
            let Some(data) = element.get("data") else {
                continue;
            };
            if let Some(id) = data.get("id").and_then(Value::as_str) {
                raw.push((id.to_string(), data.clone()));
            }
        }

        let mut metadata: HashMap<String, NodeMetadata> = HashMap::new();
        for (id, value) in raw {
            if metadata.contains_key(&id) {
                continue;
            }
            match NodeMetadata::deserialize(&value) {
                Ok(meta) => {
                    metadata.insert(id, meta);
                }
                Err(e) if mapped_ids.contains(id.as_str()) => {
                    return Err(GenomeError::InvalidMetadata {
                        id,
                        message: e.to_string(),
                    });
                }
                Err(e) => debug!("[GENOME] Skipping unmapped metadata '{}': {}", id, e),
            }
        }

        let mapped = document
            .primitive_map
            .iter()
            .chain(document.manipulative_map.iter());
        for (name, id) in mapped {
            if !metadata.contains_key(id) {
                return Err(GenomeError::MissingMetadata {
                    name: name.clone(),
                    id: id.clone(),
                });
            }
        }

        // Names shadowed by a manipulative entry are not primitives
        let primitives: Vec<NodeDescriptor> = document
            .primitive_map
            .keys()
            .filter_map(|name| {
                entries
                    .get(name)
                    .filter(|entry| entry.role == NodeRole::Primitive)
                    .map(|entry| NodeDescriptor::new(name, &entry.id, entry.role))
            })
            .collect();

        Ok(Self {
            agent: document.agent,
            entries,
            primitives: NodeSet::from(primitives),
            metadata,
        })
    }

    /// Agent identifier declared by the genome, if any
    pub fn agent(&self) -> Option<&str> {
        self.agent.as_deref()
    }

    /// Resolve a single name
    pub fn lookup(&self, name: &str) -> Option<NodeDescriptor> {
        self.entries
            .get(name)
            .map(|entry| NodeDescriptor::new(name, &entry.id, entry.role))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Every primitive node, ordered by name
    pub fn all_nodes(&self) -> &NodeSet {
        &self.primitives
    }

    /// Every resolvable name, sorted
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn metadata(&self, id: &str) -> Option<&NodeMetadata> {
        self.metadata.get(id)
    }

    /// Metadata of the node a name resolves to
    pub fn metadata_for(&self, name: &str) -> Option<&NodeMetadata> {
        self.entries
            .get(name)
            .and_then(|entry| self.metadata.get(&entry.id))
    }

    /// Genes declared for a node in the genome
    pub fn node_genes(&self, name: &str) -> Option<&Map<String, Value>> {
        self.metadata_for(name).map(|meta| &meta.genes)
    }

    /// Gene names declared for a node, sorted
    pub fn gene_names(&self, name: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .node_genes(name)
            .map(|genes| genes.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Number of resolvable names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
