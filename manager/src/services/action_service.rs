use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::actions::naming::display_name;
use crate::actions::{
    create_action, Action, ActionDetails, ActionId, ActionProgress, ActionResult, ActionType,
    HostId, NetworkState,
};
use crate::config::{Config, HostConfig};
use crate::constants::limits;
use crate::database::{ActionHistoryEntry, Database};
use crate::dispatch::{BatchDispatcher, BatchOutcome, DispatchRequest};
use crate::errors::ActionError;
use crate::history::HistoryFormatter;
use crate::inventory::NetworkInventory;

/// Shared input for every network action built from one request
struct NetworkBatch<'a> {
    host_id: HostId,
    names: &'a [String],
    known_networks: BTreeSet<String>,
    definition: Option<&'a str>,
}

/// An action with its recorded results and aggregated progress
#[derive(Debug, Clone, Serialize)]
pub struct ActionView {
    pub action: Action,
    pub results: Vec<ActionResult>,
    pub progress: ActionProgress,
}

#[derive(Clone)]
pub struct ActionService {
    config: Arc<Config>,
    database: Arc<Database>,
    inventory: NetworkInventory,
    dispatcher: BatchDispatcher,
    formatter: HistoryFormatter,
}

impl ActionService {
    pub fn new(
        config: Arc<Config>,
        database: Arc<Database>,
        inventory: NetworkInventory,
        dispatcher: BatchDispatcher,
    ) -> Self {
        Self {
            config,
            database,
            inventory,
            dispatcher,
            formatter: HistoryFormatter::new(),
        }
    }

    /// One start, stop or delete action per named network
    #[instrument(skip(self, request), fields(desired = %state, networks = request.names.len()))]
    pub async fn change_network_state(
        &self,
        host_id: HostId,
        request: &DispatchRequest,
        state: NetworkState,
    ) -> Result<BatchOutcome, ActionError> {
        self.validate_virtualization_host(host_id)?;

        let batch = NetworkBatch {
            host_id,
            names: &request.names,
            known_networks: self.inventory.networks(host_id).await,
            definition: None,
        };

        self.dispatcher
            .dispatch(&request.names, &batch, |name, batch| {
                if !batch.known_networks.contains(name) {
                    return Err(ActionError::target_not_found("Network", name));
                }
                let mut action = create_action(ActionType::NetworkStateChange);
                action.details = ActionDetails::NetworkStateChange {
                    network_name: name.to_string(),
                    state,
                };
                Ok(finish_network_action(action, batch))
            })
            .await
    }

    /// One create action per named network, all sharing one definition
    #[instrument(skip(self, request), fields(networks = request.names.len()))]
    pub async fn create_networks(
        &self,
        host_id: HostId,
        request: &DispatchRequest,
    ) -> Result<BatchOutcome, ActionError> {
        self.validate_virtualization_host(host_id)?;

        let definition = request
            .definition
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| ActionError::invalid_request("a network definition is required"))?;

        let batch = NetworkBatch {
            host_id,
            names: &request.names,
            known_networks: self.inventory.networks(host_id).await,
            definition: Some(definition),
        };

        self.dispatcher
            .dispatch(&request.names, &batch, |name, batch| {
                if batch.known_networks.contains(name) {
                    return Err(ActionError::invalid_request(format!(
                        "network '{}' already exists",
                        name
                    )));
                }
                let mut action = create_action(ActionType::NetworkCreate);
                action.details = ActionDetails::NetworkCreate {
                    network_name: name.to_string(),
                    definition: batch.definition.unwrap_or_default().to_string(),
                };
                Ok(finish_network_action(action, batch))
            })
            .await
    }

    /// A single action applying `states` on every listed host
    #[instrument(skip(self, states), fields(hosts = host_ids.len()))]
    pub async fn apply_states(
        &self,
        host_ids: &[HostId],
        states: &[String],
    ) -> Result<ActionId, ActionError> {
        if host_ids.is_empty() {
            return Err(ActionError::invalid_request("at least one host is required"));
        }
        if states.is_empty() {
            return Err(ActionError::invalid_request("at least one state is required"));
        }
        if host_ids.len() > limits::MAX_BATCH_KEYS {
            return Err(ActionError::invalid_request(format!(
                "at most {} hosts may be targeted at once",
                limits::MAX_BATCH_KEYS
            )));
        }
        for host_id in host_ids {
            self.validate_host(*host_id)?;
        }

        let mut action = create_action(ActionType::ApplyStates);
        action.details = ActionDetails::StateApplication {
            states: states.to_vec(),
        };
        action.name = display_name(&action.details, states);
        action.targets = host_ids.to_vec();

        self.database.ping().await?;
        let action_id = self.dispatcher.persist_and_schedule(action).await?;
        info!("Apply states action {} created", action_id);
        Ok(action_id)
    }

    /// Records the single outcome `host_id` reports for `action_id`
    #[instrument(skip(self, output))]
    pub async fn record_result(
        &self,
        action_id: ActionId,
        host_id: HostId,
        success: bool,
        output: String,
        return_code: Option<i32>,
    ) -> Result<ActionResult, ActionError> {
        let action = self
            .database
            .get_action(action_id)
            .await?
            .ok_or_else(|| ActionError::target_not_found("Action", action_id.to_string()))?;

        self.validate_host(host_id)?;

        if !action.targets.contains(&host_id) {
            return Err(ActionError::target_not_found(
                "Target",
                format!("host {} of action {}", host_id, action_id),
            ));
        }

        let result = ActionResult {
            action_id,
            host_id,
            success,
            output,
            return_code,
            completed_at: Utc::now(),
        };

        if let Err(e) = self.database.insert_action_result(&result).await {
            if matches!(e, ActionError::DuplicateResult { .. }) {
                warn!(
                    "Host {} reported action {} more than once; keeping the first result",
                    host_id, action_id
                );
            }
            return Err(e);
        }

        if success {
            self.inventory.apply_success(host_id, &action.details).await;
        }

        info!(
            "Recorded {} result for action {} on host {}",
            if success { "successful" } else { "failed" },
            action_id,
            host_id
        );
        Ok(result)
    }

    pub async fn action_view(&self, action_id: ActionId) -> Result<ActionView, ActionError> {
        let action = self.require_action(action_id).await?;
        let results = self.database.get_action_results(action_id).await?;
        let progress = ActionProgress::from_results(&action, &results);
        Ok(ActionView {
            action,
            results,
            progress,
        })
    }

    /// Actions that targeted the host, newest first.
    ///
    /// History survives the host being removed from configuration.
    pub async fn host_history(&self, host_id: HostId) -> Result<Vec<ActionHistoryEntry>, ActionError> {
        self.database
            .list_actions_for_host(host_id, limits::MAX_HISTORY_ACTIONS)
            .await
    }

    pub async fn history_fragment(
        &self,
        action_id: ActionId,
        host_id: HostId,
    ) -> Result<String, ActionError> {
        let action = self.require_action(action_id).await?;
        let results = self.database.get_action_results(action_id).await?;
        Ok(self.formatter.format_history(&action, &results, host_id))
    }

    pub async fn list_networks(&self, host_id: HostId) -> Result<Vec<String>, ActionError> {
        self.validate_virtualization_host(host_id)?;
        Ok(self.inventory.networks(host_id).await.into_iter().collect())
    }

    #[instrument(skip(self))]
    pub async fn delete_action(&self, action_id: ActionId) -> Result<(), ActionError> {
        if !self.database.delete_action(action_id).await? {
            return Err(ActionError::target_not_found("Action", action_id.to_string()));
        }
        info!("Action {} deleted with its details and results", action_id);
        Ok(())
    }

    /// Configured host matching `host_id`
    pub fn managed_host(&self, host_id: HostId) -> Option<&HostConfig> {
        self.config.managed_host(host_id)
    }

    async fn require_action(&self, action_id: ActionId) -> Result<Action, ActionError> {
        self.database
            .get_action(action_id)
            .await?
            .ok_or_else(|| ActionError::target_not_found("Action", action_id.to_string()))
    }

    fn validate_host(&self, host_id: HostId) -> Result<&HostConfig, ActionError> {
        self.config
            .managed_host(host_id)
            .ok_or_else(|| ActionError::target_not_found("Host", host_id.to_string()))
    }

    fn validate_virtualization_host(&self, host_id: HostId) -> Result<&HostConfig, ActionError> {
        let host = self.validate_host(host_id)?;
        if !host.virtualization_enabled {
            return Err(ActionError::invalid_request(format!(
                "host '{}' is not a virtualization host",
                host.name
            )));
        }
        Ok(host)
    }
}

fn finish_network_action(mut action: Action, batch: &NetworkBatch<'_>) -> Action {
    action.name = display_name(&action.details, batch.names);
    action.targets = vec![batch.host_id];
    action
}
