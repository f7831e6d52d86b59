// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Query dispatcher: one sequential call per target node
//!
//! Transport-level failures (no response, timeout, non-2xx, undecodable body)
//! abort the whole dispatch and discard earlier results. Body-level failures
//! are passed through untouched for the reconciler to judge.

use crate::error::QueryError;
use crate::nodes::NodeSet;
use crate::session::{Session, STATUS_OKAY};
use crate::transport::{
    HttpRequest, HttpTransport, HttpVerb, TransportError, API_KEY_HEADER, UNIQUE_ID_HEADER,
};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Payload field carrying the correlation id
pub const UNIQUE_ID_FIELD: &str = "unique_id";

/// One query against a resolved target set
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub verb: HttpVerb,
    pub path: String,
    pub payload: Option<Value>,
    pub targets: NodeSet,
    pub correlation_id: Option<String>,
}

/// Status field of a node body
#[derive(Debug, Clone, PartialEq)]
pub enum NodeStatus {
    Okay,
    /// Anything but `"okay"`; carries the remote `message` (or the status itself)
    Failed(Value),
}

impl NodeStatus {
    fn from_body(body: &Value) -> Self {
        match body.get("status") {
            Some(Value::String(status)) if status == STATUS_OKAY => NodeStatus::Okay,
            Some(status) => NodeStatus::Failed(
                body.get("message").cloned().unwrap_or_else(|| status.clone()),
            ),
            None => NodeStatus::Failed(Value::String("response has no status field".to_string())),
        }
    }
}

/// Decoded response of one node call
#[derive(Debug, Clone, PartialEq)]
pub struct RawNodeResult {
    pub node: String,
    pub body: Value,
    pub status: NodeStatus,
}

/// Issues node calls for a connected session
pub struct QueryDispatcher<'a> {
    transport: &'a dyn HttpTransport,
    session: &'a Session,
}

impl<'a> QueryDispatcher<'a> {
    pub fn new(transport: &'a dyn HttpTransport, session: &'a Session) -> Self {
        Self { transport, session }
    }

    /// Call every target in order, one at a time
    pub fn dispatch(&self, request: &QueryRequest) -> Result<Vec<RawNodeResult>, QueryError> {
        if request.targets.is_empty() {
            return Err(QueryError::NoNodesSpecified);
        }

        let (body, id_header) = outbound_body(request.payload.as_ref(), request.correlation_id.as_deref());
        let mut results = Vec::with_capacity(request.targets.len());

        for node in &request.targets {
            let url = self.session.node_url(&node.id, &request.path);
            debug!("[DISPATCH] {} {} -> node '{}'", request.verb, url, node.name);

            let mut http_request = HttpRequest::new(request.verb, url, self.session.timeout())
                .with_header(API_KEY_HEADER, self.session.api_key())
                .with_body(body.clone());
            if let Some(id) = &id_header {
                http_request = http_request.with_header(UNIQUE_ID_HEADER, id.clone());
            }

            let response = self.transport.send(&http_request).map_err(|e| match e {
                TransportError::Timeout(timeout) => QueryError::Timeout {
                    node: node.name.clone(),
                    timeout_secs: timeout.as_secs_f64(),
                },
                TransportError::Failed(message) => QueryError::Transport {
                    node: node.name.clone(),
                    message,
                },
            })?;

            if !response.is_success() {
                return Err(QueryError::HttpStatus {
                    node: node.name.clone(),
                    status: response.status,
                    body: response.body,
                });
            }

            let decoded: Value =
                serde_json::from_str(&response.body).map_err(|e| QueryError::InvalidResponse {
                    node: node.name.clone(),
                    message: e.to_string(),
                })?;
            trace!("[DISPATCH] node '{}' answered {}", node.name, decoded);

            results.push(RawNodeResult {
                node: node.name.clone(),
                status: NodeStatus::from_body(&decoded),
                body: decoded,
            });
        }

        Ok(results)
    }
}

/// Merge the correlation id into the outbound body
///
/// Object payloads get a `unique_id` field, a missing payload becomes
/// `{"unique_id": ...}`. Any other payload is sent as is and the id travels
/// in the `X-UNIQUE-ID` header instead.
fn outbound_body(payload: Option<&Value>, correlation_id: Option<&str>) -> (Option<Value>, Option<String>) {
    let Some(id) = correlation_id else {
        return (payload.cloned(), None);
    };
    match payload {
        None => {
            let mut map = Map::new();
            map.insert(UNIQUE_ID_FIELD.to_string(), Value::String(id.to_string()));
            (Some(Value::Object(map)), None)
        }
        Some(Value::Object(fields)) => {
            let mut map = fields.clone();
            map.insert(UNIQUE_ID_FIELD.to_string(), Value::String(id.to_string()));
            (Some(Value::Object(map)), None)
        }
        Some(other) => (Some(other.clone()), Some(id.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::GenomeIndex;
    use crate::nodes::resolve_nodes;
    use crate::session::{AgentInfo, DEFAULT_TIMEOUT};
    use crate::transport::HttpResponse;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn with(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpTransport for Scripted {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().push(request.clone());
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Failed("script exhausted".to_string())))
        }
    }

    fn session() -> Session {
        Session::new(
            &AgentInfo::new("key", "agent", "local", false),
            DEFAULT_TIMEOUT,
        )
    }

    fn targets(names: &[&str]) -> NodeSet {
        let genome = GenomeIndex::from_value(&json!({
            "primitive_map": { "P1": "pid1", "P2": "pid2" },
            "nodes": { "pid1": { "name": "P1" }, "pid2": { "name": "P2" } }
        }))
        .unwrap();
        resolve_nodes(&genome, names).unwrap()
    }

    fn request(names: &[&str]) -> QueryRequest {
        QueryRequest {
            verb: HttpVerb::Get,
            path: "status".to_string(),
            payload: None,
            targets: targets(names),
            correlation_id: None,
        }
    }

    fn okay(message: Value) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::json(200, &json!({ "status": "okay", "message": message })))
    }

    #[test]
    fn test_empty_targets_make_no_call() {
        let transport = Scripted::default();
        let session = session();
        let err = QueryDispatcher::new(&transport, &session)
            .dispatch(&request(&[]))
            .unwrap_err();
        assert!(matches!(err, QueryError::NoNodesSpecified));
        assert!(transport.seen.lock().is_empty());
    }

    #[test]
    fn test_sequential_in_target_order() {
        let transport = Scripted::with(vec![okay(json!(1)), okay(json!(2)), okay(json!(3))]);
        let session = session();
        let results = QueryDispatcher::new(&transport, &session)
            .dispatch(&request(&["P2", "P1", "P2"]))
            .unwrap();

        let urls: Vec<String> = transport.seen.lock().iter().map(|r| r.url.clone()).collect();
        assert_eq!(
            urls,
            vec![
                "http://agent.local/pid2/status",
                "http://agent.local/pid1/status",
                "http://agent.local/pid2/status",
            ]
        );
        let nodes: Vec<&str> = results.iter().map(|r| r.node.as_str()).collect();
        assert_eq!(nodes, vec!["P2", "P1", "P2"]);
        assert_eq!(results[2].body["message"], json!(3));
    }

    #[test]
    fn test_http_error_aborts_and_discards() {
        let transport = Scripted::with(vec![
            okay(json!("first")),
            Ok(HttpResponse::new(500, "internal error")),
            okay(json!("never")),
        ]);
        let session = session();
        let err = QueryDispatcher::new(&transport, &session)
            .dispatch(&request(&["P1", "P2", "P1"]))
            .unwrap_err();

        assert!(matches!(
            err,
            QueryError::HttpStatus { ref node, status: 500, ref body } if node == "P2" && body == "internal error"
        ));
        assert_eq!(transport.seen.lock().len(), 2);
    }

    #[test]
    fn test_timeout_is_a_query_error() {
        let transport = Scripted::with(vec![Err(TransportError::Timeout(DEFAULT_TIMEOUT))]);
        let session = session();
        let err = QueryDispatcher::new(&transport, &session)
            .dispatch(&request(&["P1"]))
            .unwrap_err();
        assert!(matches!(err, QueryError::Timeout { ref node, .. } if node == "P1"));
    }

    #[test]
    fn test_body_failure_is_forwarded() {
        let transport = Scripted::with(vec![Ok(HttpResponse::json(
            200,
            &json!({ "status": "failed", "message": "Node not found" }),
        ))]);
        let session = session();
        let results = QueryDispatcher::new(&transport, &session)
            .dispatch(&request(&["P1"]))
            .unwrap();
        assert_eq!(results[0].status, NodeStatus::Failed(json!("Node not found")));
    }

    #[test]
    fn test_body_without_status_is_a_failure() {
        let transport = Scripted::with(vec![Ok(HttpResponse::json(200, &json!({ "data": 1 })))]);
        let session = session();
        let results = QueryDispatcher::new(&transport, &session)
            .dispatch(&request(&["P1"]))
            .unwrap();
        assert!(matches!(results[0].status, NodeStatus::Failed(_)));
        assert_eq!(results[0].body, json!({ "data": 1 }));
    }

    #[test]
    fn test_undecodable_body() {
        let transport = Scripted::with(vec![Ok(HttpResponse::new(200, "not json"))]);
        let session = session();
        let err = QueryDispatcher::new(&transport, &session)
            .dispatch(&request(&["P1"]))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidResponse { .. }));
    }

    #[test]
    fn test_correlation_id_and_credentials_attached() {
        let transport = Scripted::with(vec![okay(json!({}))]);
        let session = session();
        let mut req = request(&["P1"]);
        req.verb = HttpVerb::Post;
        req.payload = Some(json!({ "strings": ["hello"] }));
        req.correlation_id = Some("cid-1".to_string());
        QueryDispatcher::new(&transport, &session).dispatch(&req).unwrap();

        let seen = transport.seen.lock();
        assert_eq!(
            seen[0].body,
            Some(json!({ "strings": ["hello"], "unique_id": "cid-1" }))
        );
        assert_eq!(seen[0].header(API_KEY_HEADER), Some("key"));
        assert_eq!(seen[0].header(UNIQUE_ID_HEADER), None);
        assert_eq!(seen[0].timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_outbound_body_variants() {
        assert_eq!(outbound_body(None, None), (None, None));
        assert_eq!(
            outbound_body(None, Some("x")),
            (Some(json!({ "unique_id": "x" })), None)
        );
        assert_eq!(
            outbound_body(Some(&json!("model-1")), Some("x")),
            (Some(json!("model-1")), Some("x".to_string()))
        );
    }
}
