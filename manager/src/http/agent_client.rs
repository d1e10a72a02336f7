use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::actions::{Action, ActionDetails, ActionId, ActionType};
use crate::config::HostConfig;
use crate::constants::http;
use crate::errors::HttpError;

/// Body of an execution request sent to an agent
#[derive(Debug, Serialize)]
pub struct ExecuteActionRequest<'a> {
    pub action_id: ActionId,
    pub action_type: ActionType,
    pub name: &'a str,
    pub details: &'a ActionDetails,
    /// Manager path the agent posts its result to
    pub report_to: String,
}

pub struct HttpAgentClient {
    client: Client,
}

impl HttpAgentClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(http::DELIVERY_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self { client }
    }

    fn agent_url(host: &HostConfig, endpoint: &str) -> String {
        format!("http://{}:{}{}", host.agent_host, host.agent_port, endpoint)
    }

    /// Hands one action to one host's agent; returns once the agent accepted it
    pub async fn deliver(
        &self,
        host: &HostConfig,
        action_id: ActionId,
        action: &Action,
    ) -> Result<(), HttpError> {
        let url = Self::agent_url(host, http::EXECUTE_ENDPOINT);
        let payload = ExecuteActionRequest {
            action_id,
            action_type: action.action_type,
            name: &action.name,
            details: &action.details,
            report_to: format!("/api/actions/{}/results", action_id),
        };

        info!("Delivering action {} to {} ({})", action_id, host.name, url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", host.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| HttpError::ConnectionFailed {
                host: host.name.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HttpError::AgentError {
                host: host.name.clone(),
                status: status.as_u16(),
                message,
            });
        }

        info!("Agent on {} accepted action {}", host.name, action_id);
        Ok(())
    }
}

impl Default for HttpAgentClient {
    fn default() -> Self {
        Self::new()
    }
}
