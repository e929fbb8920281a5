//! Handlers for the `/messages` resource.
//!
//! Any signed-in user may message any other active user. Listing and
//! read receipts only ever touch the caller's own mailbox.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use capstone_core::error::CoreError;
use capstone_core::types::DbId;
use capstone_db::models::message::{Message, MessageDetail, MessageFilter, SendMessage};
use capstone_db::repositories::{LifecycleRepo, MessageRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

/// GET /api/v1/messages?with_user=&unread_only=&limit=&offset=
///
/// Sent and received messages, newest first.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<MessageFilter>,
) -> AppResult<Json<DataResponse<Vec<MessageDetail>>>> {
    let messages = MessageRepo::list_for_user(&state.pool, auth.user_id, &filter).await?;
    Ok(Json(DataResponse::new(messages)))
}

/// POST /api/v1/messages
///
/// The receiver gets a notification pointing at their inbox.
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<SendMessage>,
) -> AppResult<(StatusCode, Json<DataResponse<Message>>)> {
    let message =
        LifecycleRepo::send_message(&state.pool, &state.event_bus, &auth.actor(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(message))))
}

/// POST /api/v1/messages/{id}/read
///
/// 204 on success, 404 if the message was not sent to the caller or is
/// already read.
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !MessageRepo::mark_read(&state.pool, id, auth.user_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Message",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/messages/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let count = MessageRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse::new(UnreadCount { count })))
}
