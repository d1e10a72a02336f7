//! Action aggregate persistence.
//!
//! An action, its details and its targets are written in one transaction so a
//! failed insert never leaves a partial aggregate behind.

use chrono::{DateTime, Utc};
use sqlx::Row;
use std::collections::HashSet;
use tracing::{debug, error};

use super::records::ActionHistoryEntry;
use super::Database;
use crate::actions::{
    Action, ActionDetails, ActionId, ActionStatus, ActionType, HostId, HostOutcome,
};
use crate::errors::ActionError;

impl Database {
    pub async fn insert_action(&self, action: &Action) -> Result<ActionId, ActionError> {
        action.validate()?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = action.targets.iter().find(|h| !seen.insert(**h)) {
            return Err(ActionError::invalid_request(format!(
                "host {} is targeted twice",
                duplicate
            )));
        }

        let payload = serde_json::to_string(&action.details)?;

        let mut tx = self.pool.begin().await?;

        let action_id = sqlx::query(
            r#"
            INSERT INTO actions (action_type, name, status, created_at, earliest)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(action.action_type.as_str())
        .bind(&action.name)
        .bind(action.status.as_str())
        .bind(action.created_at)
        .bind(action.earliest)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("INSERT INTO action_details (action_id, payload) VALUES (?, ?)")
            .bind(action_id)
            .bind(&payload)
            .execute(&mut *tx)
            .await?;

        for (position, host_id) in action.targets.iter().enumerate() {
            sqlx::query(
                "INSERT INTO action_targets (action_id, host_id, position) VALUES (?, ?, ?)",
            )
            .bind(action_id)
            .bind(*host_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        if let Err(e) = tx.commit().await {
            error!("Failed to commit action '{}': {}", action.name, e);
            return Err(e.into());
        }

        debug!("Stored action {} ({})", action_id, action.name);
        Ok(action_id)
    }

    pub async fn mark_action_scheduled(&self, action_id: ActionId) -> Result<(), ActionError> {
        sqlx::query("UPDATE actions SET status = ? WHERE id = ?")
            .bind(ActionStatus::Scheduled.as_str())
            .bind(action_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_action(&self, action_id: ActionId) -> Result<Option<Action>, ActionError> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.action_type, a.name, a.status, a.created_at, a.earliest, d.payload
            FROM actions a
            JOIN action_details d ON d.action_id = a.id
            WHERE a.id = ?
            "#,
        )
        .bind(action_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!("No action found with ID: {}", action_id);
            return Ok(None);
        };

        let targets: Vec<HostId> = sqlx::query_scalar(
            "SELECT host_id FROM action_targets WHERE action_id = ? ORDER BY position",
        )
        .bind(action_id)
        .fetch_all(&self.pool)
        .await?;

        let action_type: String = row.try_get("action_type")?;
        let status: String = row.try_get("status")?;
        let payload: String = row.try_get("payload")?;
        let details: ActionDetails = serde_json::from_str(&payload)?;

        Ok(Some(Action {
            id: Some(row.try_get("id")?),
            action_type: action_type.parse()?,
            name: row.try_get("name")?,
            status: status.parse()?,
            created_at: row.try_get("created_at")?,
            earliest: row.try_get("earliest")?,
            targets,
            details,
        }))
    }

    /// Actions that targeted `host_id`, newest first, with that host's outcome
    pub async fn list_actions_for_host(
        &self,
        host_id: HostId,
        limit: i64,
    ) -> Result<Vec<ActionHistoryEntry>, ActionError> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.action_type, a.name, a.status, a.created_at,
                   r.success, r.completed_at
            FROM action_targets t
            JOIN actions a ON a.id = t.action_id
            LEFT JOIN action_results r ON r.action_id = t.action_id AND r.host_id = t.host_id
            WHERE t.host_id = ?
            ORDER BY a.id DESC
            LIMIT ?
            "#,
        )
        .bind(host_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let action_type: String = row.try_get("action_type")?;
            let status: String = row.try_get("status")?;
            let success: Option<bool> = row.try_get("success")?;
            let completed_at: Option<DateTime<Utc>> = row.try_get("completed_at")?;
            let outcome = match success {
                Some(true) => HostOutcome::Completed,
                Some(false) => HostOutcome::Failed,
                None => HostOutcome::Pending,
            };
            entries.push(ActionHistoryEntry {
                action_id: row.try_get("id")?,
                action_type: action_type.parse::<ActionType>()?,
                name: row.try_get("name")?,
                status: status.parse()?,
                created_at: row.try_get("created_at")?,
                outcome,
                completed_at,
            });
        }
        Ok(entries)
    }

    /// Deletes an action; details, targets and results go with it
    pub async fn delete_action(&self, action_id: ActionId) -> Result<bool, ActionError> {
        let result = sqlx::query("DELETE FROM actions WHERE id = ?")
            .bind(action_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_actions(&self) -> Result<i64, ActionError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM actions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
