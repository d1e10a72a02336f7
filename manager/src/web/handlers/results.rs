// Agent result callback

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use tracing::warn;

use super::common::{
    action_error, bearer_token, json_body, unauthorized, ApiResponse, ApiResult,
};
use crate::actions::{ActionId, ActionResult, HostId};
use crate::errors::ActionError;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportResultRequest {
    pub host_id: HostId,
    pub success: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub return_code: Option<i32>,
}

/// Agents report one outcome per action; the token must be the host's api key
pub async fn report_result(
    Path(action_id): Path<ActionId>,
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ReportResultRequest>, JsonRejection>,
) -> ApiResult<ActionResult> {
    let report = json_body(payload)?;
    let host = state
        .action_service
        .managed_host(report.host_id)
        .ok_or_else(|| {
            action_error(ActionError::target_not_found(
                "Host",
                report.host_id.to_string(),
            ))
        })?;

    if bearer_token(&headers) != Some(host.api_key.as_str()) {
        warn!(
            "Rejected result for action {} claiming host {}: bad credentials",
            action_id, report.host_id
        );
        return Err(unauthorized("Invalid agent credentials"));
    }

    let result = state
        .action_service
        .record_result(
            action_id,
            report.host_id,
            report.success,
            report.output,
            report.return_code,
        )
        .await
        .map_err(action_error)?;

    Ok(Json(ApiResponse::success(result)))
}
