//! Action domain model
//!
//! An [`Action`] is one persisted unit of requested work. It owns exactly one
//! [`ActionDetails`] payload (co-located in the aggregate, never a back-pointer)
//! and, once agents report back, one [`ActionResult`] per target host.
//!
//! # Lifecycle
//!
//! ```text
//! Created → Scheduled → (per host) Completed | Failed
//! ```
//!
//! Terminal states are per host. An action is resolved only when every
//! targeted host has a result; see [`ActionProgress`].

pub mod naming;
pub mod registry;

pub use registry::create_action;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ActionError;

pub type ActionId = i64;
pub type HostId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ApplyStates,
    NetworkCreate,
    NetworkStateChange,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::ApplyStates => "apply_states",
            ActionType::NetworkCreate => "network_create",
            ActionType::NetworkStateChange => "network_state_change",
        }
    }
}

impl FromStr for ActionType {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apply_states" => Ok(ActionType::ApplyStates),
            "network_create" => Ok(ActionType::NetworkCreate),
            "network_state_change" => Ok(ActionType::NetworkStateChange),
            other => Err(ActionError::invalid_request(format!(
                "unknown action type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Created,
    Scheduled,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Created => "created",
            ActionStatus::Scheduled => "scheduled",
        }
    }
}

impl FromStr for ActionStatus {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ActionStatus::Created),
            "scheduled" => Ok(ActionStatus::Scheduled),
            other => Err(ActionError::PersistenceFailure {
                reason: format!("unknown action status '{}' in store", other),
            }),
        }
    }
}

/// Desired state for an existing virtual network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkState {
    Start,
    Stop,
    Delete,
}

impl NetworkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkState::Start => "start",
            NetworkState::Stop => "stop",
            NetworkState::Delete => "delete",
        }
    }
}

impl FromStr for NetworkState {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(NetworkState::Start),
            "stop" => Ok(NetworkState::Stop),
            "delete" => Ok(NetworkState::Delete),
            other => Err(ActionError::invalid_request(format!(
                "unsupported network state '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific payload of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDetails {
    StateApplication {
        states: Vec<String>,
    },
    NetworkCreate {
        network_name: String,
        definition: String,
    },
    NetworkStateChange {
        network_name: String,
        state: NetworkState,
    },
}

impl ActionDetails {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionDetails::StateApplication { .. } => ActionType::ApplyStates,
            ActionDetails::NetworkCreate { .. } => ActionType::NetworkCreate,
            ActionDetails::NetworkStateChange { .. } => ActionType::NetworkStateChange,
        }
    }

    pub fn network_name(&self) -> Option<&str> {
        match self {
            ActionDetails::NetworkCreate { network_name, .. }
            | ActionDetails::NetworkStateChange { network_name, .. } => Some(network_name),
            ActionDetails::StateApplication { .. } => None,
        }
    }

    /// Sets the target network; a no-op for variants without one
    pub fn set_network_name(&mut self, name: &str) {
        match self {
            ActionDetails::NetworkCreate { network_name, .. }
            | ActionDetails::NetworkStateChange { network_name, .. } => {
                *network_name = name.to_string();
            }
            ActionDetails::StateApplication { .. } => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Assigned by the store on insert
    pub id: Option<ActionId>,
    pub action_type: ActionType,
    pub name: String,
    pub status: ActionStatus,
    pub created_at: DateTime<Utc>,
    pub earliest: DateTime<Utc>,
    pub targets: Vec<HostId>,
    pub details: ActionDetails,
}

impl Action {
    /// Checks the aggregate is complete enough to persist
    pub fn validate(&self) -> Result<(), ActionError> {
        if self.details.action_type() != self.action_type {
            return Err(ActionError::invalid_request(format!(
                "details of kind '{}' attached to a '{}' action",
                self.details.action_type(),
                self.action_type
            )));
        }
        if self.name.trim().is_empty() {
            return Err(ActionError::invalid_request("action name is empty"));
        }
        if self.targets.is_empty() {
            return Err(ActionError::invalid_request("action has no target hosts"));
        }

        match &self.details {
            ActionDetails::StateApplication { states } => {
                if states.is_empty() || states.iter().any(|s| s.trim().is_empty()) {
                    return Err(ActionError::invalid_request(
                        "state names must be non-empty",
                    ));
                }
            }
            ActionDetails::NetworkCreate {
                network_name,
                definition,
            } => {
                if network_name.trim().is_empty() {
                    return Err(ActionError::invalid_request("network name is empty"));
                }
                if definition.trim().is_empty() {
                    return Err(ActionError::invalid_request("network definition is empty"));
                }
            }
            ActionDetails::NetworkStateChange { network_name, .. } => {
                if network_name.trim().is_empty() {
                    return Err(ActionError::invalid_request("network name is empty"));
                }
            }
        }

        Ok(())
    }
}

/// Outcome of one action on one host, reported once by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_id: ActionId,
    pub host_id: HostId,
    pub success: bool,
    pub output: String,
    pub return_code: Option<i32>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostOutcome {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionProgress {
    pub total_targets: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub resolved: bool,
}

impl ActionProgress {
    pub fn from_results(action: &Action, results: &[ActionResult]) -> Self {
        let mut completed = 0;
        let mut failed = 0;
        for host_id in &action.targets {
            match host_outcome(results, *host_id) {
                HostOutcome::Completed => completed += 1,
                HostOutcome::Failed => failed += 1,
                HostOutcome::Pending => {}
            }
        }
        let total_targets = action.targets.len();
        let pending = total_targets - completed - failed;
        Self {
            total_targets,
            completed,
            failed,
            pending,
            resolved: pending == 0,
        }
    }
}

pub fn host_outcome(results: &[ActionResult], host_id: HostId) -> HostOutcome {
    match results.iter().find(|r| r.host_id == host_id) {
        Some(r) if r.success => HostOutcome::Completed,
        Some(_) => HostOutcome::Failed,
        None => HostOutcome::Pending,
    }
}
