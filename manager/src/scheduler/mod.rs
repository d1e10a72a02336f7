//! Fire-and-forget submission of created actions to agents
//!
//! The dispatcher hands every persisted action to [`ActionScheduler::submit`],
//! which only enqueues it. A [`DeliveryWorker`] drains the queue in the
//! background and spawns one delivery per (action, host).
//!
//! # Failure handling
//!
//! - Agent unreachable or rejecting the request: a failed result is recorded
//!   for that host with the error text, so the history shows why nothing ran.
//! - Host removed from configuration since dispatch: same, with an explanation.
//! - Results arriving later through the callback are never overwritten; if the
//!   agent reports after a failed delivery was recorded, the duplicate is
//!   rejected at the recording boundary.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::actions::{Action, ActionId, ActionResult, HostId};
use crate::config::Config;
use crate::database::Database;
use crate::errors::ActionError;
use crate::http::HttpAgentClient;

/// One persisted action waiting for delivery
#[derive(Debug, Clone)]
pub struct ScheduledAction {
    pub action_id: ActionId,
    pub action: Action,
}

#[derive(Clone)]
pub struct ActionScheduler {
    sender: mpsc::UnboundedSender<ScheduledAction>,
}

impl ActionScheduler {
    /// Creates a scheduler and the receiving end its worker drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ScheduledAction>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn submit(&self, action_id: ActionId, action: Action) -> Result<(), ActionError> {
        self.sender
            .send(ScheduledAction { action_id, action })
            .map_err(|_| ActionError::PersistenceFailure {
                reason: format!("delivery queue closed, action {} not scheduled", action_id),
            })?;
        debug!("Action {} queued for delivery", action_id);
        Ok(())
    }
}

pub struct DeliveryWorker {
    config: Arc<Config>,
    database: Arc<Database>,
    client: Arc<HttpAgentClient>,
}

impl DeliveryWorker {
    pub fn new(config: Arc<Config>, database: Arc<Database>, client: Arc<HttpAgentClient>) -> Self {
        Self {
            config,
            database,
            client,
        }
    }

    /// Drains the queue until every scheduler handle is dropped
    pub async fn run(self, mut receiver: mpsc::UnboundedReceiver<ScheduledAction>) {
        info!(
            "Delivery worker started (delivery {})",
            if self.config.delivery_enabled {
                "enabled"
            } else {
                "disabled"
            }
        );

        while let Some(scheduled) = receiver.recv().await {
            if !self.config.delivery_enabled {
                debug!(
                    "Delivery disabled, action {} stays scheduled",
                    scheduled.action_id
                );
                continue;
            }

            let scheduled = Arc::new(scheduled);
            for host_id in scheduled.action.targets.clone() {
                let config = self.config.clone();
                let database = self.database.clone();
                let client = self.client.clone();
                let scheduled = scheduled.clone();

                tokio::spawn(async move {
                    Self::deliver_to_host(&config, &database, &client, &scheduled, host_id).await;
                });
            }
        }

        info!("Delivery queue closed, worker stopping");
    }

    async fn deliver_to_host(
        config: &Config,
        database: &Database,
        client: &HttpAgentClient,
        scheduled: &ScheduledAction,
        host_id: HostId,
    ) {
        let failure = match config.managed_host(host_id) {
            Some(host) => match client
                .deliver(host, scheduled.action_id, &scheduled.action)
                .await
            {
                Ok(()) => return,
                Err(e) => format!("Delivery to agent failed: {}", e),
            },
            None => format!("Host {} is no longer managed", host_id),
        };

        warn!(
            "Action {} could not be delivered to host {}: {}",
            scheduled.action_id, host_id, failure
        );

        let result = ActionResult {
            action_id: scheduled.action_id,
            host_id,
            success: false,
            output: failure,
            return_code: None,
            completed_at: Utc::now(),
        };

        match database.insert_action_result(&result).await {
            Ok(()) => {}
            Err(ActionError::DuplicateResult { .. }) => {
                debug!(
                    "Host {} already reported action {}",
                    host_id, scheduled.action_id
                );
            }
            Err(e) => error!(
                "Failed to record delivery failure for action {} on host {}: {}",
                scheduled.action_id, host_id, e
            ),
        }
    }
}
