use crate::auth::AuthUser;
use crate::db::models::{Club, Membership, Role};
use crate::domain::{ClubUpdate, NewClub};
use crate::error::ClubError;
use crate::extract::JsonBody;
use crate::startup::AppState;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_public() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub logo: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub logo: Option<String>,
    pub member_count: i64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<MemberResponse>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub user_id: Uuid,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub success: bool,
    pub message: String,
}

impl From<Membership> for MemberResponse {
    fn from(m: Membership) -> Self {
        MemberResponse {
            user_id: m.user_id,
            role: m.role,
            joined_at: m.joined_at,
        }
    }
}

fn club_response(club: Club, member_count: i64, members: Option<Vec<Membership>>) -> ClubResponse {
    ClubResponse {
        id: club.id,
        name: club.name,
        description: club.description,
        logo: club.logo,
        member_count,
        is_public: club.is_public,
        created_at: club.created_at,
        members: members.map(|ms| ms.into_iter().map(MemberResponse::from).collect()),
    }
}

/// Create a club; the caller becomes its admin
pub async fn create_club(
    Extension(app_state): Extension<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<CreateClubRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let club = app_state
        .clubs
        .create_club(
            user_id,
            NewClub {
                name: payload.name,
                description: payload.description,
                logo: payload.logo,
                is_public: payload.is_public,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(club_response(club, 1, None))))
}

pub async fn list_clubs(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
) -> Result<impl IntoResponse, ClubError> {
    let clubs = app_state.clubs.list_clubs().await?;
    let ledger = &app_state.clubs;
    let counts = try_join_all(clubs.iter().map(|c| ledger.member_count(c.id))).await?;

    let response: Vec<ClubResponse> = clubs
        .into_iter()
        .zip(counts)
        .map(|(club, count)| club_response(club, count, None))
        .collect();

    Ok((StatusCode::OK, Json(response)))
}

/// Club detail including its member list
pub async fn get_club(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path(club_id): Path<Uuid>,
) -> Result<impl IntoResponse, ClubError> {
    let club = app_state.clubs.get_club(club_id).await?;
    let members = app_state.clubs.members(club_id).await?;
    let count = members.len() as i64;

    Ok((StatusCode::OK, Json(club_response(club, count, Some(members)))))
}

pub async fn update_club(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path(club_id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateClubRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let club = app_state
        .clubs
        .update_club(
            club_id,
            ClubUpdate {
                name: payload.name,
                description: payload.description,
                logo: payload.logo,
                is_public: payload.is_public,
            },
        )
        .await?;
    let count = app_state.clubs.member_count(club_id).await?;

    Ok((StatusCode::OK, Json(club_response(club, count, None))))
}

/// Delete a club with its memberships, events, polls and messages
pub async fn delete_club(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path(club_id): Path<Uuid>,
) -> Result<impl IntoResponse, ClubError> {
    app_state.clubs.delete_club(club_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path(club_id): Path<Uuid>,
) -> Result<impl IntoResponse, ClubError> {
    let members: Vec<MemberResponse> = app_state
        .clubs
        .members(club_id)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(members)))
}

pub async fn join_club(
    Extension(app_state): Extension<AppState>,
    AuthUser(user_id): AuthUser,
    Path(club_id): Path<Uuid>,
) -> Result<impl IntoResponse, ClubError> {
    app_state.clubs.join(club_id, user_id).await?;

    Ok((
        StatusCode::OK,
        Json(MembershipResponse {
            success: true,
            message: "Successfully joined.".to_string(),
        }),
    ))
}

pub async fn leave_club(
    Extension(app_state): Extension<AppState>,
    AuthUser(user_id): AuthUser,
    Path(club_id): Path<Uuid>,
) -> Result<impl IntoResponse, ClubError> {
    app_state.clubs.leave(club_id, user_id).await?;

    Ok((
        StatusCode::OK,
        Json(MembershipResponse {
            success: true,
            message: "Successfully left.".to_string(),
        }),
    ))
}
