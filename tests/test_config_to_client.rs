//! A configuration file drives client construction end to end

use gaius::agent::{
    AgentClient, AgentInfo, ClientSettings, HttpRequest, HttpResponse, HttpTransport,
    ReconciledResult, TransportError,
};
use gaius::config::{load_config, validate_config};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const CONFIG: &str = r#"
[agent]
api_key = "file-key"
name = "alpha"
domain = "agents.example"
secure = false
url = "http://localhost:8000"

[client]
timeout_secs = 4.0
summarize_for_single_node = false

[nodes]
ingress = ["P1"]
query = ["P1", "P2"]
"#;

#[derive(Default)]
struct Replay {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl HttpTransport for Replay {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| TransportError::Failed("no response queued".to_string()))
    }
}

#[test]
fn config_file_builds_a_working_client() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gaius_agent.toml");
    fs::write(&path, CONFIG).unwrap();

    let mut cli = HashMap::new();
    cli.insert("api_key".to_string(), "cli-key".to_string());
    let config = load_config(Some(&path), Some(&cli)).unwrap();
    validate_config(&config).unwrap();

    let replay = Arc::new(Replay::default());
    replay.responses.lock().push_back(HttpResponse::json(
        200,
        &json!({
            "status": "okay",
            "connection": "okay",
            "genie": "alpha",
            "genome": {
                "primitive_map": { "P1": "pid1", "P2": "pid2" },
                "nodes": { "pid1": { "name": "P1" }, "pid2": { "name": "P2" } }
            }
        }),
    ));
    replay.responses.lock().push_back(HttpResponse::json(
        200,
        &json!({ "status": "okay", "message": "awake" }),
    ));

    let mut client = AgentClient::with_transport(
        AgentInfo::from(&config.agent),
        Box::new(Arc::clone(&replay)),
    )
    .with_settings(ClientSettings::from(&config.client));
    assert_eq!(client.timeout(), Duration::from_secs(4));

    client.connect().unwrap();
    client.set_ingress_nodes(&config.nodes.ingress).unwrap();
    client.set_query_nodes(&config.nodes.query).unwrap();
    assert_eq!(client.query_nodes().len(), 2);

    let outcome = client.learn().unwrap();
    assert_eq!(
        outcome.result,
        ReconciledResult::ByNode([("P1".to_string(), json!("awake"))].into_iter().collect())
    );

    let requests = replay.requests.lock();
    assert_eq!(requests[0].url, "http://localhost:8000/connect");
    assert_eq!(requests[0].header("X-API-KEY"), Some("cli-key"));
    assert_eq!(requests[1].url, "http://localhost:8000/pid1/learn");
    assert_eq!(requests[1].timeout, Duration::from_secs(4));
}

#[test]
fn client_from_config_uses_configured_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gaius_agent.toml");
    fs::write(&path, CONFIG).unwrap();

    let config = load_config(Some(&path), None).unwrap();
    let client = AgentClient::from_config(&config).unwrap();
    assert!(!client.is_connected());
    assert!(!client.settings().summarize_for_single_node);
    assert!(client.settings().send_unique_ids);
    assert_eq!(client.info().url.as_deref(), Some("http://localhost:8000"));
}
