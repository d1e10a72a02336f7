// Virtual network batch endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;

use super::common::{action_error, json_body, ApiError, ApiResponse, ApiResult};
use crate::actions::{HostId, NetworkState};
use crate::dispatch::{BatchOutcome, DispatchRequest};
use crate::web::AppState;

type BatchResponse = Result<(StatusCode, Json<BatchOutcome>), ApiError>;

/// 200 when anything was created, 422 with the same body otherwise
fn batch_response(outcome: BatchOutcome) -> (StatusCode, Json<BatchOutcome>) {
    let status = if outcome.created.is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    (status, Json(outcome))
}

/// Start, stop or delete the named networks on one host
pub async fn change_network_state(
    Path((host_id, desired)): Path<(HostId, String)>,
    State(state): State<AppState>,
    payload: Result<Json<DispatchRequest>, JsonRejection>,
) -> BatchResponse {
    let request = json_body(payload)?;
    let desired: NetworkState = desired.parse().map_err(action_error)?;
    info!(
        "Network {} requested on host {} for {:?}",
        desired, host_id, request.names
    );

    let outcome = state
        .action_service
        .change_network_state(host_id, &request, desired)
        .await
        .map_err(action_error)?;
    Ok(batch_response(outcome))
}

pub async fn create_networks(
    Path(host_id): Path<HostId>,
    State(state): State<AppState>,
    payload: Result<Json<DispatchRequest>, JsonRejection>,
) -> BatchResponse {
    let request = json_body(payload)?;
    info!(
        "Network creation requested on host {} for {:?}",
        host_id, request.names
    );

    let outcome = state
        .action_service
        .create_networks(host_id, &request)
        .await
        .map_err(action_error)?;
    Ok(batch_response(outcome))
}

pub async fn list_networks(
    Path(host_id): Path<HostId>,
    State(state): State<AppState>,
) -> ApiResult<Vec<String>> {
    let networks = state
        .action_service
        .list_networks(host_id)
        .await
        .map_err(action_error)?;
    Ok(Json(ApiResponse::success(networks)))
}
