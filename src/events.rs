use crate::auth::AuthUser;
use crate::domain::{EventWithAttendees, NewEvent};
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
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub club_id: Uuid,
    pub created_by: Uuid,
    pub attendees: Vec<Uuid>,
    pub location: Option<String>,
}

impl From<EventWithAttendees> for EventResponse {
    fn from(e: EventWithAttendees) -> Self {
        EventResponse {
            id: e.event.id,
            title: e.event.title,
            description: e.event.description,
            start_date: e.event.start_date,
            end_date: e.event.end_date,
            club_id: e.event.club_id,
            created_by: e.event.created_by,
            attendees: e.attendees,
            location: e.event.location,
        }
    }
}

pub async fn create_event(
    Extension(app_state): Extension<AppState>,
    AuthUser(user_id): AuthUser,
    Path(club_id): Path<Uuid>,
    JsonBody(payload): JsonBody<CreateEventRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let event = app_state
        .events
        .create_event(
            club_id,
            user_id,
            NewEvent {
                title: payload.title,
                description: payload.description,
                start_date: payload.start_date,
                end_date: payload.end_date,
                location: payload.location,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// Events of a club ordered by start date
pub async fn list_events(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path(club_id): Path<Uuid>,
) -> Result<impl IntoResponse, ClubError> {
    let events: Vec<EventResponse> = app_state
        .events
        .list_events(club_id)
        .await?
        .into_iter()
        .map(EventResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(events)))
}

pub async fn get_event(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path((club_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ClubError> {
    let event = app_state.events.get_event(club_id, event_id).await?;

    Ok((StatusCode::OK, Json(EventResponse::from(event))))
}

pub async fn join_event(
    Extension(app_state): Extension<AppState>,
    AuthUser(user_id): AuthUser,
    Path((club_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ClubError> {
    app_state
        .events
        .join_event(club_id, event_id, user_id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Successfully joined event."
        })),
    ))
}
