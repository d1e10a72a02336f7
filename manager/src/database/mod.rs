//! Database layer for the action manager.
//!
//! This module provides SQLite persistence for:
//! - Actions, their details payload and their target hosts
//! - Per-host action results
//!
//! The module is organized into submodules:
//! - `records` - Read-side record types
//! - `actions` - Action aggregate persistence
//! - `results` - Result recording and lookup

mod actions;
mod records;
mod results;

pub use records::*;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use tracing::{error, info};

use crate::errors::ActionError;

pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Expose pool for integration test queries
    #[allow(dead_code)]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn new(database_path: &str) -> Result<Self> {
        info!("Initializing database at {}", database_path);

        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    error!("Failed to create parent directory {:?}: {}", parent, e);
                    return Err(e.into());
                }
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path);
        let options = SqliteConnectOptions::from_str(&database_url)?
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = match SqlitePoolOptions::new().connect_with(options).await {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to connect to database {}: {}", database_url, e);
                return Err(e.into());
            }
        };

        let database = Self { pool };
        database.initialize_tables().await?;

        info!("Database initialized");
        Ok(database)
    }

    /// Private in-memory database on a single connection
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.initialize_tables().await?;
        Ok(database)
    }

    /// Cheap reachability check
    pub async fn ping(&self) -> Result<(), ActionError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Closes the pool; subsequent queries fail with a persistence error
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn initialize_tables(&self) -> Result<()> {
        let statements = [
            (
                "actions",
                r#"
                CREATE TABLE IF NOT EXISTS actions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    action_type TEXT NOT NULL,
                    name TEXT NOT NULL,
                    status TEXT NOT NULL,
                    created_at DATETIME NOT NULL,
                    earliest DATETIME NOT NULL
                )
                "#,
            ),
            (
                "action_details",
                r#"
                CREATE TABLE IF NOT EXISTS action_details (
                    action_id INTEGER PRIMARY KEY REFERENCES actions(id) ON DELETE CASCADE,
                    payload TEXT NOT NULL
                )
                "#,
            ),
            (
                "action_targets",
                r#"
                CREATE TABLE IF NOT EXISTS action_targets (
                    action_id INTEGER NOT NULL REFERENCES actions(id) ON DELETE CASCADE,
                    host_id INTEGER NOT NULL,
                    position INTEGER NOT NULL,
                    PRIMARY KEY (action_id, host_id)
                )
                "#,
            ),
            (
                "idx_action_targets_host",
                "CREATE INDEX IF NOT EXISTS idx_action_targets_host ON action_targets(host_id, action_id DESC)",
            ),
            // No foreign key to hosts: results outlive host deregistration
            (
                "action_results",
                r#"
                CREATE TABLE IF NOT EXISTS action_results (
                    action_id INTEGER NOT NULL REFERENCES actions(id) ON DELETE CASCADE,
                    host_id INTEGER NOT NULL,
                    success BOOLEAN NOT NULL,
                    output TEXT NOT NULL,
                    return_code INTEGER,
                    completed_at DATETIME NOT NULL,
                    PRIMARY KEY (action_id, host_id)
                )
                "#,
            ),
        ];

        for (name, sql) in statements {
            if let Err(e) = sqlx::query(sql).execute(&self.pool).await {
                error!("FAILED to create {}: {}", name, e);
                return Err(e.into());
            }
            info!("{} ready", name);
        }

        Ok(())
    }
}
