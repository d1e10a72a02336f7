pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::config::Config;
use crate::services::ActionService;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub action_service: Arc<ActionService>,
}

impl AppState {
    pub fn new(config: Arc<Config>, action_service: Arc<ActionService>) -> Self {
        Self {
            config,
            action_service,
        }
    }
}
