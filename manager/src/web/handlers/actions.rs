// Action status, history and cleanup endpoints

use axum::{
    extract::{Path, State},
    response::{Html, Json},
};
use serde_json::{json, Value};

use super::common::{action_error, ApiError, ApiResponse, ApiResult};
use crate::actions::{ActionId, HostId};
use crate::database::ActionHistoryEntry;
use crate::services::ActionView;
use crate::web::AppState;

pub async fn get_action(
    Path(action_id): Path<ActionId>,
    State(state): State<AppState>,
) -> ApiResult<ActionView> {
    let view = state
        .action_service
        .action_view(action_id)
        .await
        .map_err(action_error)?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn delete_action(
    Path(action_id): Path<ActionId>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    state
        .action_service
        .delete_action(action_id)
        .await
        .map_err(action_error)?;
    Ok(Json(ApiResponse::success(json!({ "deleted": action_id }))))
}

pub async fn host_history(
    Path(host_id): Path<HostId>,
    State(state): State<AppState>,
) -> ApiResult<Vec<ActionHistoryEntry>> {
    let entries = state
        .action_service
        .host_history(host_id)
        .await
        .map_err(action_error)?;
    Ok(Json(ApiResponse::success(entries)))
}

/// Escaped result fragment for one host, empty while the host is pending
pub async fn history_fragment(
    Path((host_id, action_id)): Path<(HostId, ActionId)>,
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    let fragment = state
        .action_service
        .history_fragment(action_id, host_id)
        .await
        .map_err(action_error)?;
    Ok(Html(fragment))
}
