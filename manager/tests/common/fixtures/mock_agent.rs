//! Mock HTTP agent server for testing
//!
//! Accepts (or rejects) execution requests the way a host agent would,
//! without a real agent running.

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock agent server that simulates agent HTTP responses
pub struct MockAgentServer {
    pub server: MockServer,
}

impl MockAgentServer {
    /// Create a new mock agent server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn host(&self) -> String {
        self.server.address().ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.server.address().port()
    }

    /// Accept execution requests carrying `api_key`
    pub async fn mock_execute_accepted(&self, api_key: &str) {
        Mock::given(method("POST"))
            .and(path("/actions/execute"))
            .and(header("authorization", format!("Bearer {}", api_key).as_str()))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "status": "accepted"
            })))
            .mount(&self.server)
            .await;
    }

    /// Reject every execution request with `status`
    pub async fn mock_execute_rejected(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path("/actions/execute"))
            .respond_with(ResponseTemplate::new(status).set_body_string(message))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every execution request received so far
    pub async fn received_executions(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == "/actions/execute")
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }
}
