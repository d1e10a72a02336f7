//! Central repository for configuration constants and fixed operator-facing labels
//!
//! Organized by category to keep timeouts, limits and display strings in one place.

use std::time::Duration;

/// HTTP client constants for agent delivery
pub mod http {
    use super::Duration;

    /// Timeout for delivering an action to an agent
    pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Agent endpoint that accepts actions for execution
    pub const EXECUTE_ENDPOINT: &str = "/actions/execute";
}

/// Default configuration values
pub mod defaults {
    /// Default bind host for the web server
    pub const HOST: &str = "0.0.0.0";

    /// Default bind port for the web server
    pub const PORT: u16 = 8096;

    /// Default SQLite database location
    pub const DATABASE_PATH: &str = "data/actions.db";

    /// Default port for agent HTTP servers
    pub const AGENT_PORT: u16 = 8745;
}

/// Limits and constraints
pub mod limits {
    /// Maximum number of actions returned by the per-host history listing
    pub const MAX_HISTORY_ACTIONS: i64 = 200;

    /// Maximum number of target keys accepted in one batch
    pub const MAX_BATCH_KEYS: usize = 256;
}

/// Operator-facing labels used for action names and history fragments
pub mod labels {
    pub const APPLY_STATES: &str = "Apply states";
    pub const NETWORK_CREATE: &str = "Create Virtual Network";
    pub const NETWORK_START: &str = "Start Virtual Network";
    pub const NETWORK_STOP: &str = "Stop Virtual Network";
    pub const NETWORK_DELETE: &str = "Delete Virtual Network";

    /// Label preceding each escaped output block in a history fragment
    pub const HISTORY_RESULTS: &str = "Results:";
}
