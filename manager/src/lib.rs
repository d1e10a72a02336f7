pub mod actions;
pub mod config;
pub mod constants;
pub mod database;
pub mod dispatch;
pub mod errors;
pub mod history;
pub mod http;
pub mod inventory;
pub mod scheduler;
pub mod services;
pub mod web;

// Re-export commonly used types
pub use actions::{Action, ActionDetails, ActionResult, ActionType};
pub use config::{Config, ConfigManager, HostConfig};
pub use database::Database;
pub use dispatch::{BatchDispatcher, BatchOutcome, DispatchRequest};
pub use errors::ActionError;
pub use history::HistoryFormatter;
pub use http::HttpAgentClient;
pub use inventory::NetworkInventory;
pub use scheduler::{ActionScheduler, DeliveryWorker};
pub use services::ActionService;
