//! Action result database operations.
//!
//! Results are append-only. The `(action_id, host_id)` primary key is the
//! single arbiter of duplicates, so two concurrent reports for the same pair
//! cannot both succeed.

use sqlx::Row;
use tracing::{debug, error};

use super::Database;
use crate::actions::{ActionId, ActionResult, HostId};
use crate::errors::ActionError;

impl Database {
    pub async fn insert_action_result(&self, result: &ActionResult) -> Result<(), ActionError> {
        debug!(
            "Storing result for action {} on host {}",
            result.action_id, result.host_id
        );

        let outcome = sqlx::query(
            r#"
            INSERT INTO action_results (
                action_id, host_id, success, output, return_code, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result.action_id)
        .bind(result.host_id)
        .bind(result.success)
        .bind(&result.output)
        .bind(result.return_code)
        .bind(result.completed_at)
        .execute(&self.pool)
        .await;

        match outcome {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation()
                    || db_err.message().contains("UNIQUE constraint failed") =>
            {
                Err(ActionError::DuplicateResult {
                    action_id: result.action_id,
                    host_id: result.host_id,
                })
            }
            Err(e) => {
                error!(
                    "Failed to store result for action {} on host {}: {}",
                    result.action_id, result.host_id, e
                );
                Err(e.into())
            }
        }
    }

    pub async fn get_action_results(
        &self,
        action_id: ActionId,
    ) -> Result<Vec<ActionResult>, ActionError> {
        let rows = sqlx::query(
            r#"
            SELECT action_id, host_id, success, output, return_code, completed_at
            FROM action_results
            WHERE action_id = ?
            ORDER BY completed_at, host_id
            "#,
        )
        .bind(action_id)
        .fetch_all(&self.pool)
        .await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(ActionResult {
                action_id: row.try_get("action_id")?,
                host_id: row.try_get("host_id")?,
                success: row.try_get("success")?,
                output: row.try_get("output")?,
                return_code: row.try_get("return_code")?,
                completed_at: row.try_get("completed_at")?,
            });
        }
        Ok(results)
    }

    pub async fn get_action_result(
        &self,
        action_id: ActionId,
        host_id: HostId,
    ) -> Result<Option<ActionResult>, ActionError> {
        let results = self.get_action_results(action_id).await?;
        Ok(results.into_iter().find(|r| r.host_id == host_id))
    }
}
