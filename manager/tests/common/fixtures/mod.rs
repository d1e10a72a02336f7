//! This module provides reusable test utilities:
//! - Mock agent HTTP server
//! - Test configuration builders
//! - A fully wired application over an in-memory database
//! - Common test data

// Not every test binary uses every fixture
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_agent;
pub mod test_app;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use mock_agent::MockAgentServer;
pub use test_app::TestApp;
pub use test_config::{TestConfig, TestConfigBuilder};
pub use test_data::*;
