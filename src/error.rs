use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Rejections reported to callers of the club endpoints.
///
/// Everything except `Database` is a client-facing, recoverable condition.
#[derive(Error, Debug)]
pub enum ClubError {
    #[error("Authentication credentials were not provided or are invalid")]
    Unauthenticated,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("A club with that name already exists")]
    ClubNameTaken,
    #[error("Already a member")]
    AlreadyMember,
    #[error("Not a member")]
    NotMember,
    #[error("Already joined this event")]
    AlreadyAttending,
    #[error("optionId is required")]
    MissingOption,
    #[error("Invalid poll option")]
    InvalidOption,
    #[error("You already voted for this option")]
    DuplicateVote,
    #[error("Poll is closed")]
    PollClosed,
    #[error("Database error: {0}")]
    Database(String),
}

impl ClubError {
    /// Stable machine-readable kind, rendered as the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ClubError::Unauthenticated => "unauthenticated",
            ClubError::NotFound(_) => "not_found",
            ClubError::InvalidRequest(_) => "invalid_request",
            ClubError::ClubNameTaken => "club_name_taken",
            ClubError::AlreadyMember => "already_member",
            ClubError::NotMember => "not_member",
            ClubError::AlreadyAttending => "already_attending",
            ClubError::MissingOption => "missing_option",
            ClubError::InvalidOption => "invalid_option",
            ClubError::DuplicateVote => "duplicate_vote",
            ClubError::PollClosed => "poll_closed",
            ClubError::Database(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ClubError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ClubError::NotFound(_) => StatusCode::NOT_FOUND,
            ClubError::InvalidRequest(_)
            | ClubError::NotMember
            | ClubError::MissingOption
            | ClubError::InvalidOption
            | ClubError::PollClosed => StatusCode::BAD_REQUEST,
            ClubError::ClubNameTaken
            | ClubError::AlreadyMember
            | ClubError::AlreadyAttending
            | ClubError::DuplicateVote => StatusCode::CONFLICT,
            ClubError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ClubError::InvalidRequest(reason.into())
    }
}

impl IntoResponse for ClubError {
    fn into_response(self) -> Response {
        let details = match &self {
            ClubError::Database(msg) => {
                error!("storage failure: {msg}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": self.kind(),
            "details": details
        }));

        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for ClubError {
    fn from(rejection: JsonRejection) -> Self {
        ClubError::InvalidRequest(rejection.body_text())
    }
}

impl From<sqlx::Error> for ClubError {
    fn from(error: sqlx::Error) -> Self {
        ClubError::Database(error.to_string())
    }
}
