//! Scripted in-memory agent for integration tests

#![allow(dead_code)]

use gaius_agent::{AgentClient, AgentInfo, HttpRequest, HttpResponse, HttpTransport, TransportError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Replays queued responses in order and records every request
#[derive(Default)]
pub struct ScriptedAgent {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedAgent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .push_back(Ok(HttpResponse::json(status, &body)));
    }

    pub fn respond_okay(&self, message: Value) {
        self.respond(200, json!({ "status": "okay", "message": message }));
    }

    pub fn respond_raw(&self, status: u16, body: &str) {
        self.responses.lock().push_back(Ok(HttpResponse::new(status, body)));
    }

    pub fn time_out(&self, after: Duration) {
        self.responses.lock().push_back(Err(TransportError::Timeout(after)));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }
}

impl HttpTransport for ScriptedAgent {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Failed("connection refused".to_string())))
    }
}

/// Two primitive nodes and one manipulative node
pub fn genome() -> Value {
    json!({
        "agent": "test_agent",
        "primitive_map": { "P1": "pid1", "P2": "pid2" },
        "manipulative_map": { "M1": "mid1" },
        "nodes": {
            "pid1": { "name": "P1", "type": "primitive", "genes": { "recall_threshold": 0.1 } },
            "pid2": { "name": "P2", "type": "primitive" },
            "mid1": { "name": "M1", "type": "manipulative" }
        }
    })
}

pub fn handshake_body() -> Value {
    json!({
        "status": "okay",
        "connection": "okay",
        "genie": "test_genie",
        "genome": genome()
    })
}

pub fn agent_info() -> AgentInfo {
    AgentInfo::new("test-key", "test-agent", "test.com", false)
}

pub fn client(agent: &Arc<ScriptedAgent>) -> AgentClient {
    AgentClient::with_transport(agent_info(), Box::new(Arc::clone(agent)))
}

/// Client that has already completed a handshake
pub fn connected_client(agent: &Arc<ScriptedAgent>) -> AgentClient {
    agent.respond(200, handshake_body());
    let mut client = client(agent);
    client.connect().expect("handshake should succeed");
    client
}
