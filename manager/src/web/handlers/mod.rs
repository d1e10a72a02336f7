//! HTTP request handlers for the Manager API.
//!
//! This module is organized by domain:
//! - `actions` - Action status, per-host history and cleanup
//! - `common` - Shared response envelope, error mapping and auth helpers
//! - `networks` - Virtual network batch dispatch and inventory
//! - `results` - Agent result callback
//! - `states` - State application

pub mod actions;
pub mod common;
pub mod networks;
pub mod results;
pub mod states;

pub use actions::*;
pub use networks::*;
pub use results::*;
pub use states::*;
