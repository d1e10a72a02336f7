//! Batch dispatch
//!
//! Turns one request naming N target keys into N independently tracked
//! actions. Each key is built, persisted and scheduled on its own; a failure
//! is recorded against its key and never blocks or rolls back a sibling.
//!
//! # Guarantees
//!
//! - An empty key list is rejected before anything is built
//! - An unreachable store is reported once for the whole batch
//! - `created` keeps input order; `created.len() + failed.len() == N` for
//!   unique keys
//! - Every per-key step uses its own transaction
//! - Dispatch returns as soon as actions are queued for delivery

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::actions::{Action, ActionId};
use crate::constants::limits;
use crate::database::Database;
use crate::errors::ActionError;
use crate::scheduler::ActionScheduler;

/// Request body decoded by the HTTP layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

/// Aggregated outcome of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    #[serde(rename = "ids")]
    pub created: Vec<ActionId>,
    #[serde(rename = "errors")]
    pub failed: BTreeMap<String, String>,
}

impl BatchOutcome {
    pub fn is_total_failure(&self) -> bool {
        self.created.is_empty() && !self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct BatchDispatcher {
    database: Arc<Database>,
    scheduler: ActionScheduler,
}

impl BatchDispatcher {
    pub fn new(database: Arc<Database>, scheduler: ActionScheduler) -> Self {
        Self {
            database,
            scheduler,
        }
    }

    /// Builds, persists and schedules one action per key.
    ///
    /// `build` is called once per key with the shared `context`. Keys are
    /// processed concurrently; outcomes are collected positionally.
    #[instrument(skip(self, context, build), fields(batch = %Uuid::new_v4(), keys = target_keys.len()))]
    pub async fn dispatch<C, F>(
        &self,
        target_keys: &[String],
        context: &C,
        build: F,
    ) -> Result<BatchOutcome, ActionError>
    where
        F: Fn(&str, &C) -> Result<Action, ActionError>,
    {
        if target_keys.is_empty() {
            return Err(ActionError::invalid_request(
                "at least one target name is required",
            ));
        }
        if target_keys.len() > limits::MAX_BATCH_KEYS {
            return Err(ActionError::invalid_request(format!(
                "at most {} targets may be dispatched at once",
                limits::MAX_BATCH_KEYS
            )));
        }

        self.database.ping().await?;

        let build = &build;
        let steps = target_keys.iter().map(|key| async move {
            let outcome = match build(key.as_str(), context) {
                Ok(action) => self.persist_and_schedule(action).await,
                Err(e) => Err(e),
            };
            (key, outcome)
        });

        let mut batch = BatchOutcome::default();
        for (key, outcome) in join_all(steps).await {
            match outcome {
                Ok(action_id) => batch.created.push(action_id),
                Err(e) => {
                    warn!("Target {} failed: {}", key, e);
                    batch.failed.insert(key.clone(), e.to_string());
                }
            }
        }

        info!(
            "Batch finished: {} created, {} failed",
            batch.created.len(),
            batch.failed.len()
        );
        Ok(batch)
    }

    /// Persists one action and queues it for delivery
    pub async fn persist_and_schedule(&self, action: Action) -> Result<ActionId, ActionError> {
        let action_id = self.database.insert_action(&action).await?;

        if let Err(e) = self.scheduler.submit(action_id, action) {
            // Never leave an action behind that nothing will deliver
            if let Err(cleanup) = self.database.delete_action(action_id).await {
                warn!("Failed to remove unscheduled action {}: {}", action_id, cleanup);
            }
            return Err(e);
        }

        if let Err(e) = self.database.mark_action_scheduled(action_id).await {
            warn!(
                "Action {} was queued but its status could not be updated: {}",
                action_id, e
            );
        }

        Ok(action_id)
    }
}
