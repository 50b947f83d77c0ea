use crate::auth::AuthUser;
use crate::db::models::{Message, MessageKind};
use crate::error::ClubError;
use crate::extract::JsonBody;
use crate::startup::AppState;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
    #[serde(default, rename = "type")]
    pub kind: MessageKind,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub content: String,
    pub club_id: Uuid,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        MessageResponse {
            id: m.id,
            content: m.content,
            club_id: m.club_id,
            user_id: m.user_id,
            timestamp: m.timestamp,
            kind: m.kind,
        }
    }
}

/// Chat history of a club, newest first
pub async fn list_messages(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path(club_id): Path<Uuid>,
) -> Result<impl IntoResponse, ClubError> {
    let messages: Vec<MessageResponse> = app_state
        .chat
        .history(club_id)
        .await?
        .into_iter()
        .map(MessageResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(messages)))
}

pub async fn post_message(
    Extension(app_state): Extension<AppState>,
    AuthUser(user_id): AuthUser,
    Path(club_id): Path<Uuid>,
    JsonBody(payload): JsonBody<PostMessageRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let message = app_state
        .chat
        .post(club_id, user_id, payload.content, payload.kind)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}
