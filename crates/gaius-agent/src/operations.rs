// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Agent operations
//!
//! Each free function builds the [`Query`] for one agent endpoint with its
//! default targets; pass it through [`Query::with_nodes`] to address other
//! nodes. The matching [`AgentClient`] methods send the default query.

use crate::client::{AgentClient, Query, Targets};
use crate::error::Result;
use crate::observation::Observation;
use crate::reconcile::QueryOutcome;
use serde_json::{json, Map, Value};

pub fn show_status() -> Query {
    Query::get("status").with_targets(Targets::AllNodes)
}

/// Observation for the ingress nodes; rejected before sending if invalid
pub fn observe(observation: &Observation) -> Result<Query> {
    let payload = observation.to_payload()?;
    Ok(Query::post("observe")
        .with_payload(payload)
        .with_targets(Targets::IngressNodes))
}

pub fn learn() -> Query {
    Query::post("learn").with_targets(Targets::IngressNodes)
}

pub fn get_predictions() -> Query {
    Query::get("predictions").with_targets(Targets::QueryNodes)
}

pub fn get_wm() -> Query {
    Query::get("working-memory").with_targets(Targets::QueryNodes)
}

pub fn clear_wm() -> Query {
    Query::post("working-memory/clear").with_targets(Targets::AllNodes)
}

pub fn clear_all_memory() -> Query {
    Query::post("clear-all-memory").with_targets(Targets::AllNodes)
}

pub fn start_predicting() -> Query {
    Query::post("start-predicting").with_targets(Targets::AllNodes)
}

pub fn stop_predicting() -> Query {
    Query::post("stop-predicting").with_targets(Targets::AllNodes)
}

pub fn start_sleeping() -> Query {
    Query::post("sleeping/start").with_targets(Targets::AllNodes)
}

pub fn stop_sleeping() -> Query {
    Query::post("sleeping/stop").with_targets(Targets::AllNodes)
}

pub fn get_gene(gene: &str) -> Query {
    Query::get(format!("gene/{gene}")).with_targets(Targets::QueryNodes)
}

pub fn change_genes(genes: Map<String, Value>) -> Query {
    Query::post("genes/change")
        .with_payload(json!({ "data": genes }))
        .with_targets(Targets::QueryNodes)
}

pub fn get_model(model: &str) -> Query {
    Query::get("model")
        .with_payload(json!({ "data": model }))
        .with_targets(Targets::QueryNodes)
}

pub fn delete_model(model: &str) -> Query {
    Query::delete("model")
        .with_payload(json!({ "data": model }))
        .with_targets(Targets::QueryNodes)
}

impl AgentClient {
    /// Status of every primitive node
    pub fn show_status(&self) -> Result<QueryOutcome> {
        self.query(show_status())
    }

    /// Send one observation to the ingress nodes
    pub fn observe(&self, observation: &Observation) -> Result<QueryOutcome> {
        self.query(observe(observation)?)
    }

    /// Commit the ingress nodes' working memory as a sequence
    pub fn learn(&self) -> Result<QueryOutcome> {
        self.query(learn())
    }

    pub fn get_predictions(&self) -> Result<QueryOutcome> {
        self.query(get_predictions())
    }

    pub fn get_wm(&self) -> Result<QueryOutcome> {
        self.query(get_wm())
    }

    pub fn clear_wm(&self) -> Result<QueryOutcome> {
        self.query(clear_wm())
    }

    pub fn clear_all_memory(&self) -> Result<QueryOutcome> {
        self.query(clear_all_memory())
    }

    pub fn start_predicting(&self) -> Result<QueryOutcome> {
        self.query(start_predicting())
    }

    pub fn stop_predicting(&self) -> Result<QueryOutcome> {
        self.query(stop_predicting())
    }

    pub fn start_sleeping(&self) -> Result<QueryOutcome> {
        self.query(start_sleeping())
    }

    pub fn stop_sleeping(&self) -> Result<QueryOutcome> {
        self.query(stop_sleeping())
    }

    pub fn get_gene(&self, gene: &str) -> Result<QueryOutcome> {
        self.query(get_gene(gene))
    }

    pub fn change_genes(&self, genes: Map<String, Value>) -> Result<QueryOutcome> {
        self.query(change_genes(genes))
    }

    pub fn get_model(&self, model: &str) -> Result<QueryOutcome> {
        self.query(get_model(model))
    }

    pub fn delete_model(&self, model: &str) -> Result<QueryOutcome> {
        self.query(delete_model(model))
    }
}
