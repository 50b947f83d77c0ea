use crate::auth::AuthUser;
use crate::db::models::{PollOption, PollStatus};
use crate::domain::{NewPoll, PollDetails, PollUpdate, Tally};
use crate::error::ClubError;
use crate::extract::JsonBody;
use crate::startup::AppState;
use axum::{
    extract::{Extension, Json, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Request/Response DTOs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub question: String,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub options: Vec<OptionRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OptionRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePollRequest {
    pub question: Option<String>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CastVoteRequest {
    #[serde(default, rename = "optionId", alias = "option_id")]
    pub option_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<PollOptionResponse>,
    pub club_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: PollStatus,
    pub total_votes: i64,
}

#[derive(Debug, Serialize)]
pub struct PollOptionResponse {
    pub id: Uuid,
    pub text: String,
    pub votes: i64,
    pub voters: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyResponse {
    pub poll_id: Uuid,
    pub options: Vec<OptionTallyResponse>,
    pub total_votes: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTallyResponse {
    pub option_id: Uuid,
    pub text: String,
    pub votes: i64,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub message: String,
    pub option: PollOptionResponse,
}

impl From<PollOption> for PollOptionResponse {
    fn from(option: PollOption) -> Self {
        PollOptionResponse {
            id: option.id,
            votes: option.votes(),
            text: option.text,
            voters: option.voters,
        }
    }
}

impl From<PollDetails> for PollResponse {
    fn from(details: PollDetails) -> Self {
        let status = details.status();
        let total_votes = details.tally().total_votes;
        let PollDetails { poll, options } = details;

        PollResponse {
            id: poll.id,
            question: poll.question,
            options: options.into_iter().map(PollOptionResponse::from).collect(),
            club_id: poll.club_id,
            created_by: poll.created_by,
            created_at: poll.created_at,
            ends_at: poll.ends_at,
            status,
            total_votes,
        }
    }
}

impl From<Tally> for TallyResponse {
    fn from(tally: Tally) -> Self {
        TallyResponse {
            poll_id: tally.poll_id,
            options: tally
                .options
                .into_iter()
                .map(|o| OptionTallyResponse {
                    option_id: o.option_id,
                    text: o.text,
                    votes: o.votes,
                })
                .collect(),
            total_votes: tally.total_votes,
        }
    }
}

/// Create a new poll in a club (authenticated users only)
pub async fn create_poll(
    Extension(app_state): Extension<AppState>,
    AuthUser(user_id): AuthUser,
    Path(club_id): Path<Uuid>,
    JsonBody(payload): JsonBody<CreatePollRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let new_poll = NewPoll {
        question: payload.question,
        ends_at: payload.ends_at,
        options: payload.options.into_iter().map(|o| o.text).collect(),
    };

    let details = app_state.polls.create_poll(club_id, user_id, new_poll).await?;

    Ok((StatusCode::CREATED, Json(PollResponse::from(details))))
}

/// Get all polls of a club, newest first
pub async fn list_polls(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path(club_id): Path<Uuid>,
) -> Result<impl IntoResponse, ClubError> {
    let polls = app_state.polls.list_polls(club_id).await?;
    let response: Vec<PollResponse> = polls.into_iter().map(PollResponse::from).collect();

    Ok((StatusCode::OK, Json(response)))
}

/// Get a specific poll with all its options and vote counts
pub async fn get_poll(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path((club_id, poll_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ClubError> {
    let details = app_state.polls.get_poll(club_id, poll_id).await?;

    Ok((StatusCode::OK, Json(PollResponse::from(details))))
}

pub async fn update_poll(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path((club_id, poll_id)): Path<(Uuid, Uuid)>,
    JsonBody(payload): JsonBody<UpdatePollRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let update = PollUpdate {
        question: payload.question,
        ends_at: payload.ends_at,
    };
    let details = app_state.polls.update_poll(club_id, poll_id, update).await?;

    Ok((StatusCode::OK, Json(PollResponse::from(details))))
}

pub async fn delete_poll(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path((club_id, poll_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ClubError> {
    app_state.polls.delete_poll(club_id, poll_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_tally(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path((club_id, poll_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ClubError> {
    let tally = app_state.polls.tally(club_id, poll_id).await?;

    Ok((StatusCode::OK, Json(TallyResponse::from(tally))))
}

/// Cast a vote on a poll option (authenticated users only)
pub async fn vote_on_poll(
    Extension(app_state): Extension<AppState>,
    AuthUser(user_id): AuthUser,
    Path((club_id, poll_id)): Path<(Uuid, Uuid)>,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ClubError> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        // a bare POST carries no option
        Err(JsonRejection::MissingJsonContentType(_)) => CastVoteRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    let option = app_state
        .polls
        .vote(club_id, poll_id, payload.option_id.as_deref(), user_id)
        .await?;

    let response = VoteResponse {
        success: true,
        message: "Vote recorded.".to_string(),
        option: option.into(),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Append an option to a poll (any authenticated user)
pub async fn add_option(
    Extension(app_state): Extension<AppState>,
    AuthUser(_): AuthUser,
    Path((club_id, poll_id)): Path<(Uuid, Uuid)>,
    JsonBody(payload): JsonBody<OptionRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let option = app_state
        .polls
        .add_option(club_id, poll_id, &payload.text)
        .await?;

    Ok((StatusCode::CREATED, Json(PollOptionResponse::from(option))))
}
