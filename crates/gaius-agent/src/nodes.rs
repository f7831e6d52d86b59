// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Node descriptors, node sets and name resolution

use crate::error::QueryError;
use crate::genome::{GenomeIndex, NodeRole};

/// A node resolved against the genome
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeDescriptor {
    pub name: String,
    pub id: String,
    pub role: NodeRole,
}

impl NodeDescriptor {
    pub(crate) fn new(name: &str, id: &str, role: NodeRole) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            role,
        }
    }
}

/// Ordered target list; repeated names are kept and dispatched repeatedly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet(Vec<NodeDescriptor>);

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeDescriptor> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|node| node.name.as_str())
    }

    pub fn as_slice(&self) -> &[NodeDescriptor] {
        &self.0
    }
}

impl From<Vec<NodeDescriptor>> for NodeSet {
    fn from(nodes: Vec<NodeDescriptor>) -> Self {
        NodeSet(nodes)
    }
}

impl std::ops::Index<usize> for NodeSet {
    type Output = NodeDescriptor;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a NodeDescriptor;
    type IntoIter = std::slice::Iter<'a, NodeDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Resolve names against the genome, preserving order and duplicates
///
/// Fails on the first unknown name. An empty input yields an empty set; the
/// dispatcher is what rejects empty targets.
pub fn resolve_nodes<S: AsRef<str>>(
    genome: &GenomeIndex,
    names: &[S],
) -> Result<NodeSet, QueryError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            genome.lookup(name).ok_or_else(|| QueryError::UnknownNode {
                name: name.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(NodeSet::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn genome() -> GenomeIndex {
        GenomeIndex::from_value(&json!({
            "primitive_map": { "P1": "pid1", "P2": "pid2" },
            "manipulative_map": { "M1": "mid1" },
            "nodes": {
                "pid1": { "name": "P1" },
                "pid2": { "name": "P2" },
                "mid1": { "name": "M1" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_preserves_order_and_duplicates() {
        let nodes = resolve_nodes(&genome(), &["P2", "P1", "P2", "M1"]).unwrap();
        let names: Vec<&str> = nodes.names().collect();
        assert_eq!(names, vec!["P2", "P1", "P2", "M1"]);
        assert_eq!(nodes[0].id, "pid2");
        assert_eq!(nodes[3].role, NodeRole::Manipulative);
    }

    #[test]
    fn test_resolve_unknown_names_first_offender() {
        let err = resolve_nodes(&genome(), &["P1", "Ghost", "Phantom"]).unwrap_err();
        assert!(err.is_resolution_error());
        assert!(matches!(err, QueryError::UnknownNode { ref name } if name == "Ghost"));
    }

    #[test]
    fn test_resolve_empty_is_accepted() {
        let names: [&str; 0] = [];
        assert!(resolve_nodes(&genome(), &names).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_owned_strings() {
        let names = vec!["P1".to_string()];
        assert_eq!(resolve_nodes(&genome(), &names).unwrap().len(), 1);
    }
}
