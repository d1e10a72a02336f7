//! Database record types (read side).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::actions::{ActionId, ActionStatus, ActionType, HostOutcome};

/// One row of a host's action history listing
#[derive(Debug, Clone, Serialize)]
pub struct ActionHistoryEntry {
    pub action_id: ActionId,
    pub action_type: ActionType,
    pub name: String,
    pub status: ActionStatus,
    pub created_at: DateTime<Utc>,
    pub outcome: HostOutcome,
    pub completed_at: Option<DateTime<Utc>>,
}
