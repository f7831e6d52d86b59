// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Observation payloads sent to ingress nodes

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One observation event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub strings: Vec<String>,
    #[serde(default)]
    pub vectors: Vec<Vec<f64>>,
    #[serde(default)]
    pub emotives: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Observation {
    pub fn from_strings<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strings: strings.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_vector(mut self, vector: Vec<f64>) -> Self {
        self.vectors.push(vector);
        self
    }

    pub fn with_emotive(mut self, name: impl Into<String>, value: f64) -> Self {
        self.emotives.insert(name.into(), value);
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Reject observations the agent cannot ingest
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.strings.is_empty() && self.vectors.is_empty() {
            return Err(QueryError::InvalidData(
                "observation carries neither strings nor vectors".to_string(),
            ));
        }
        if let Some(first) = self.vectors.first() {
            if let Some(bad) = self.vectors.iter().position(|v| v.len() != first.len()) {
                return Err(QueryError::InvalidData(format!(
                    "vector {} has length {}, expected {}",
                    bad,
                    self.vectors[bad].len(),
                    first.len()
                )));
            }
        }
        if let Some((name, _)) = self.emotives.iter().find(|(_, value)| !value.is_finite()) {
            return Err(QueryError::InvalidData(format!("emotive '{name}' is not finite")));
        }
        Ok(())
    }

    /// Validated JSON payload
    pub fn to_payload(&self) -> Result<Value, QueryError> {
        self.validate()?;
        serde_json::to_value(self).map_err(|e| QueryError::InvalidData(e.to_string()))
    }
}
