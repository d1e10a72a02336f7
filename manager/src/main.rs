use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use action_manager::web::{start_web_server, AppState};
use action_manager::{
    ActionScheduler, ActionService, BatchDispatcher, ConfigManager, Database, DeliveryWorker,
    HttpAgentClient, NetworkInventory,
};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("action_manager=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("sqlx=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting Action Manager");

    // Load configuration
    let config_manager = ConfigManager::new("config".to_string()).await?;
    let config = config_manager.get_current_config();
    info!(
        "Configuration loaded: {} managed hosts, {} with virtualization",
        config.hosts.len(),
        config
            .hosts
            .values()
            .filter(|h| h.virtualization_enabled)
            .count()
    );

    // Initialize database
    let database = Arc::new(Database::new(&config.database_path).await?);
    info!("Database initialized at {}", config.database_path);

    let inventory = NetworkInventory::from_config(&config);

    // Start delivery worker
    let (scheduler, receiver) = ActionScheduler::channel();
    let worker = DeliveryWorker::new(
        config.clone(),
        database.clone(),
        Arc::new(HttpAgentClient::new()),
    );
    tokio::spawn(worker.run(receiver));
    if !config.delivery_enabled {
        warn!("Agent delivery is disabled; actions will be recorded but not executed");
    }

    let dispatcher = BatchDispatcher::new(database.clone(), scheduler);
    let action_service = Arc::new(ActionService::new(
        config.clone(),
        database.clone(),
        inventory,
        dispatcher,
    ));
    info!("Action service initialized");

    // Start web server
    let state = AppState::new(config, action_service);
    start_web_server(state).await?;

    database.close().await;
    Ok(())
}
