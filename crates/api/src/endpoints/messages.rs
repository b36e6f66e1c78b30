//! Message inbox endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;
use soko_common::AppResult;
use soko_store::entities::Message;

use crate::middleware::AppState;

/// Message response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: u64,
    pub from_user_id: String,
    pub to_user_id: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            from_user_id: m.from_user_id,
            to_user_id: m.to_user_id,
            content: m.content,
            is_read: m.is_read,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Messages received by a user, newest first.
async fn inbox(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<MessageResponse>>> {
    let messages = state.notifications.list_for_user(&id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// Mark a received message as read.
async fn mark_read(
    State(state): State<AppState>,
    Path((id, message_id)): Path<(String, u64)>,
) -> AppResult<Json<MessageResponse>> {
    let message = state.notifications.mark_read(&id, message_id).await?;
    Ok(Json(message.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/messages", get(inbox))
        .route("/{id}/messages/{message_id}/read", post(mark_read))
}
