use crate::error::ClubError;
use axum::extract::FromRequest;

/// `axum::Json` for request bodies, rejecting with [`ClubError`] so a
/// malformed body renders like every other client error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ClubError))]
pub struct JsonBody<T>(pub T);
