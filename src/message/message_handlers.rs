use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::Result,
    middleware::AuthUser,
    state::AppState,
    message::{
        message_dto::{ConversationSummary, SendMessageRequest, StatusResponse},
        message_models::{Message, ReadMark},
    },
};

/// Send a message to another user
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent successfully", body = Message),
        (status = 400, description = "Empty message content"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Receiver not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let message = state
        .message_service
        .send_message(user_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Get the transcript with another user, oldest first
///
/// Opening a thread marks the counterpart's messages as read. The returned
/// items carry the read flags from before that update.
#[utoipa::path(
    get,
    path = "/api/messages/{user_id}",
    tag = "messages",
    params(
        ("user_id" = Uuid, Path, description = "Other user ID to get the thread with")
    ),
    responses(
        (status = 200, description = "Thread messages in ascending timestamp order", body = Vec<Message>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_thread(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(other_user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let messages = state
        .message_service
        .get_thread(user_id, other_user_id)
        .await?;

    Ok((StatusCode::OK, Json(messages)))
}

/// Get one summary per conversation partner
#[utoipa::path(
    get,
    path = "/api/conversations",
    tag = "messages",
    responses(
        (status = 200, description = "List of conversations", body = Vec<ConversationSummary>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_conversations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse> {
    let conversations = state
        .message_service
        .list_conversations(user_id)
        .await?;

    Ok((StatusCode::OK, Json(conversations)))
}

/// Mark messages from a sender as delivered
#[utoipa::path(
    put,
    path = "/api/messages/deliver/{sender_id}",
    tag = "messages",
    params(
        ("sender_id" = Uuid, Path, description = "User whose messages were delivered")
    ),
    responses(
        (status = 200, description = "Messages marked as delivered", body = StatusResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_delivered(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(sender_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    mark(state, user_id, sender_id, ReadMark::Delivered).await
}

/// Mark messages from a sender as read
#[utoipa::path(
    put,
    path = "/api/messages/read/{sender_id}",
    tag = "messages",
    params(
        ("sender_id" = Uuid, Path, description = "User whose messages were read")
    ),
    responses(
        (status = 200, description = "Messages marked as read", body = StatusResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(sender_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    mark(state, user_id, sender_id, ReadMark::Read).await
}

async fn mark(
    state: AppState,
    user_id: Uuid,
    sender_id: Uuid,
    read_mark: ReadMark,
) -> Result<(StatusCode, Json<StatusResponse>)> {
    let updated = state
        .message_service
        .mark_thread(user_id, sender_id, read_mark)
        .await?;

    Ok((
        StatusCode::OK,
        Json(StatusResponse {
            message: format!("Messages marked as {}", read_mark),
            updated,
        }),
    ))
}
