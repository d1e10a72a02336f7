//! Fully wired application over an in-memory database

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

use action_manager::scheduler::ScheduledAction;
use action_manager::web::{create_router, AppState};
use action_manager::{
    ActionScheduler, ActionService, BatchDispatcher, Config, Database, DeliveryWorker,
    HttpAgentClient, NetworkInventory,
};

use super::test_config::TestConfig;

pub struct TestApp {
    pub config: Arc<Config>,
    pub database: Arc<Database>,
    pub inventory: NetworkInventory,
    pub service: Arc<ActionService>,
    pub router: Router,
    receiver: Option<UnboundedReceiver<ScheduledAction>>,
    _test_config: TestConfig,
}

impl TestApp {
    pub async fn new(test_config: TestConfig) -> Self {
        let config = test_config.load().await;
        let database = Arc::new(
            Database::in_memory()
                .await
                .expect("Failed to create test database"),
        );
        let inventory = NetworkInventory::from_config(&config);
        let (scheduler, receiver) = ActionScheduler::channel();
        let dispatcher = BatchDispatcher::new(database.clone(), scheduler);
        let service = Arc::new(ActionService::new(
            config.clone(),
            database.clone(),
            inventory.clone(),
            dispatcher,
        ));
        let router = create_router(AppState::new(config.clone(), service.clone()));

        Self {
            config,
            database,
            inventory,
            service,
            router,
            receiver: Some(receiver),
            _test_config: test_config,
        }
    }

    /// Hands queued actions to agents from now on
    pub fn start_delivery(&mut self) {
        let receiver = self
            .receiver
            .take()
            .expect("Delivery worker already started");
        let worker = DeliveryWorker::new(
            self.config.clone(),
            self.database.clone(),
            Arc::new(HttpAgentClient::new()),
        );
        tokio::spawn(worker.run(receiver));
    }

    /// Actions queued for delivery and not yet taken by a worker
    pub fn queued_action_ids(&mut self) -> Vec<i64> {
        let receiver = self.receiver.as_mut().expect("Delivery worker running");
        let mut ids = Vec::new();
        while let Ok(scheduled) = receiver.try_recv() {
            ids.push(scheduled.action_id);
        }
        ids
    }

    /// Sends one request through the router
    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, body.to_vec())
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");
        let (status, bytes) = self.request(request).await;
        (status, parse_json(&bytes))
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        let (status, bytes) = self.request(request).await;
        (status, parse_json(&bytes))
    }
}

fn parse_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}

/// Polls `check` until it holds or the timeout expires
pub async fn wait_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check().await
}
