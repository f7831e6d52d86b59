// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport seam
//!
//! The client never talks to `reqwest` directly; it hands [`HttpRequest`]s to
//! an [`HttpTransport`]. [`ReqwestTransport`] is the production
//! implementation, tests plug in scripted ones.

use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Header carrying the agent API key
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Header carrying a correlation id when the payload cannot embed it
pub const UNIQUE_ID_HEADER: &str = "X-UNIQUE-ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
        }
    }
}

impl Display for HttpVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub verb: HttpVerb,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(verb: HttpVerb, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            verb,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response: status plus undecoded body text
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Failed(String),
}

/// Sends requests and returns raw responses
///
/// Implementations must honour `HttpRequest::timeout` and report expiry as
/// [`TransportError::Timeout`].
pub trait HttpTransport: Send {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + Sync + ?Sized> HttpTransport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Blocking `reqwest` transport
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| TransportError::Failed(format!("HTTP client init failed: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.verb {
            HttpVerb::Get => reqwest::Method::GET,
            HttpVerb::Post => reqwest::Method::POST,
            HttpVerb::Put => reqwest::Method::PUT,
            HttpVerb::Patch => reqwest::Method::PATCH,
            HttpVerb::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout(request.timeout)
            } else {
                TransportError::Failed(e.to_string())
            }
        };

        let response = builder.send().map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(classify)?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::new(HttpVerb::Post, "http://agent/pid1/observe", Duration::from_secs(2))
            .with_header(API_KEY_HEADER, "secret")
            .with_body(Some(json!({ "strings": ["hello"] })));
        assert_eq!(request.header("x-api-key"), Some("secret"));
        assert_eq!(request.verb.to_string(), "POST");
        assert!(request.body.is_some());
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, "{}").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(401, "denied").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
    }
}
