use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    error::Result,
    message::StatusResponse,
    middleware::AuthUser,
    state::AppState,
};
use super::{alert_models::MarkAlertsReadRequest, alert_repository::AlertStore};

/// Mark a batch of emergency alerts as read
#[utoipa::path(
    put,
    path = "/api/alerts/read",
    tag = "alerts",
    request_body = MarkAlertsReadRequest,
    responses(
        (status = 200, description = "Alerts marked as read", body = StatusResponse),
        (status = 400, description = "No alert ids given"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_alerts_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<MarkAlertsReadRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let updated = state
        .alert_repository
        .mark_alerts_read(&payload.alert_ids)
        .await?;

    tracing::debug!("User {} marked {} alert(s) as read", user_id, updated);

    Ok((
        StatusCode::OK,
        Json(StatusResponse {
            message: "Alerts marked as read".to_string(),
            updated,
        }),
    ))
}
