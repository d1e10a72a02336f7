// State application endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::common::{action_error, json_body, ApiResponse, ApiResult};
use crate::actions::HostId;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct ApplyStatesRequest {
    pub host_ids: Vec<HostId>,
    pub states: Vec<String>,
}

pub async fn apply_states(
    State(state): State<AppState>,
    payload: Result<Json<ApplyStatesRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let request = json_body(payload)?;
    info!(
        "Applying states {:?} on hosts {:?}",
        request.states, request.host_ids
    );

    let action_id = state
        .action_service
        .apply_states(&request.host_ids, &request.states)
        .await
        .map_err(action_error)?;

    Ok(Json(ApiResponse::success(json!({
        "action_id": action_id,
        "targets": request.host_ids.len()
    }))))
}
