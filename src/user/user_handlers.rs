use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{error::Result, middleware::AuthUser, state::AppState};
use super::user_models::User;

/// Get current user profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "User profile retrieved successfully", body = User),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_current_user(user_id).await?;

    Ok((StatusCode::OK, Json(user)))
}

/// List staff members the current user can message
#[utoipa::path(
    get,
    path = "/api/users/contacts",
    tag = "users",
    responses(
        (status = 200, description = "Messaging-eligible users", body = Vec<User>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse> {
    let contacts = state.user_service.list_contacts(user_id).await?;

    Ok((StatusCode::OK, Json(contacts)))
}
