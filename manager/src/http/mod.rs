//! HTTP communication module for agent delivery
//!
//! Each managed host runs an agent that executes actions locally and reports
//! the outcome back to the manager's results endpoint.
//!
//! # Architecture
//!
//! ```text
//! Manager → POST /actions/execute → Agent (port 8745)
//!    ↑                                  ↓
//! Result ← POST /api/actions/{id}/results
//! ```
//!
//! Delivery is one request per (action, host). The manager never polls; the
//! agent's callback is the only way a result is produced for a delivered action.

pub mod agent_client;

pub use agent_client::HttpAgentClient;
