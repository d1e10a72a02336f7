use crate::web::{handlers, AppState};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub async fn start_web_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // === VIRTUAL NETWORK ROUTES ===
        .route(
            "/api/systems/{host_id}/virtualization/nets",
            get(handlers::list_networks),
        )
        .route(
            "/api/systems/{host_id}/virtualization/nets/create",
            post(handlers::create_networks),
        )
        .route(
            "/api/systems/{host_id}/virtualization/nets/{state}",
            post(handlers::change_network_state),
        )
        // === STATE APPLICATION ROUTES ===
        .route("/api/systems/states/apply", post(handlers::apply_states))
        // === HISTORY ROUTES ===
        .route(
            "/api/systems/{host_id}/history",
            get(handlers::host_history),
        )
        .route(
            "/api/systems/{host_id}/history/{action_id}",
            get(handlers::history_fragment),
        )
        // === ACTION ROUTES ===
        .route(
            "/api/actions/{action_id}",
            get(handlers::get_action).delete(handlers::delete_action),
        )
        .route(
            "/api/actions/{action_id}/results",
            post(handlers::report_result),
        )
        // Add middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
