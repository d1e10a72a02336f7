//! Custom error types for the action manager
//!
//! Provides structured error handling with context for different failure scenarios.

use std::fmt;

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// HTTP communication error variants
#[derive(Debug)]
pub enum HttpError {
    /// Connection to agent failed
    ConnectionFailed { host: String, reason: String },

    /// Agent rejected the request
    AgentError {
        host: String,
        status: u16,
        message: String,
    },
}

/// Action error variants, one per failure class surfaced to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The request itself is malformed; the whole batch is rejected
    InvalidRequest { reason: String },

    /// A referenced host, network, or action does not exist
    TargetNotFound { kind: String, name: String },

    /// A second completion report arrived for the same (action, host) pair
    DuplicateResult { action_id: i64, host_id: i64 },

    /// The underlying store failed or is unreachable
    PersistenceFailure { reason: String },
}

impl ActionError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        ActionError::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn target_not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        ActionError::TargetNotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

// Implement Display for all error types
impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::ConnectionFailed { host, reason } => {
                write!(f, "Connection to {} failed: {}", host, reason)
            }
            HttpError::AgentError {
                host,
                status,
                message,
            } => {
                write!(f, "Agent {} returned {}: {}", host, status, message)
            }
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::InvalidRequest { reason } => {
                write!(f, "Invalid request: {}", reason)
            }
            ActionError::TargetNotFound { kind, name } => {
                write!(f, "{} '{}' not found", kind, name)
            }
            ActionError::DuplicateResult { action_id, host_id } => {
                write!(
                    f,
                    "Result for action {} on host {} was already recorded",
                    action_id, host_id
                )
            }
            ActionError::PersistenceFailure { reason } => {
                write!(f, "Persistence failure: {}", reason)
            }
        }
    }
}

// Implement std::error::Error
impl std::error::Error for ConfigError {}
impl std::error::Error for HttpError {}
impl std::error::Error for ActionError {}

impl From<sqlx::Error> for ActionError {
    fn from(err: sqlx::Error) -> Self {
        ActionError::PersistenceFailure {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        ActionError::PersistenceFailure {
            reason: format!("Failed to (de)serialize action details: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_messages() {
        assert_eq!(
            ActionError::target_not_found("Network", "isolated").to_string(),
            "Network 'isolated' not found"
        );
        assert_eq!(
            ActionError::DuplicateResult {
                action_id: 7,
                host_id: 1000010000
            }
            .to_string(),
            "Result for action 7 on host 1000010000 was already recorded"
        );
    }
}
