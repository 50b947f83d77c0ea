use crate::auth::JwtKeys;
use crate::db::store::Store;
use crate::domain::{ClubChat, MembershipLedger, ParticipationLedger, PollEngine, PollPolicy};
use crate::{clubs, events, messages, polls};
use axum::{
    Json, Router,
    extract::Extension,
    http::{
        Method, StatusCode,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Handles shared by every request. Built once at startup; the store is the
/// only mutable state behind it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt: Arc<JwtKeys>,
    pub clubs: MembershipLedger,
    pub events: ParticipationLedger,
    pub polls: PollEngine,
    pub chat: ClubChat,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt_secret: &str, policy: PollPolicy) -> Self {
        AppState {
            jwt: Arc::new(JwtKeys::new(jwt_secret)),
            clubs: MembershipLedger::new(store.clone()),
            events: ParticipationLedger::new(store.clone()),
            polls: PollEngine::new(store.clone(), policy),
            chat: ClubChat::new(store.clone()),
            store,
        }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    let api = Router::new()
        .route("/clubs", get(clubs::list_clubs).post(clubs::create_club))
        .route(
            "/clubs/:club_id",
            get(clubs::get_club)
                .patch(clubs::update_club)
                .delete(clubs::delete_club),
        )
        .route("/clubs/:club_id/join", post(clubs::join_club))
        .route("/clubs/:club_id/leave", post(clubs::leave_club))
        .route("/clubs/:club_id/members", get(clubs::list_members))
        .route(
            "/clubs/:club_id/messages",
            get(messages::list_messages).post(messages::post_message),
        )
        .route(
            "/clubs/:club_id/events",
            get(events::list_events).post(events::create_event),
        )
        .route("/clubs/:club_id/events/:event_id", get(events::get_event))
        .route(
            "/clubs/:club_id/events/:event_id/join",
            post(events::join_event),
        )
        .route(
            "/clubs/:club_id/polls",
            get(polls::list_polls).post(polls::create_poll),
        )
        .route(
            "/clubs/:club_id/polls/:poll_id",
            get(polls::get_poll)
                .patch(polls::update_poll)
                .delete(polls::delete_poll),
        )
        .route("/clubs/:club_id/polls/:poll_id/tally", get(polls::get_tally))
        .route("/clubs/:club_id/polls/:poll_id/vote", post(polls::vote_on_poll))
        .route(
            "/clubs/:club_id/polls/:poll_id/add_option",
            post(polls::add_option),
        );

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(handler_404)
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_credentials(true)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([CONTENT_TYPE, ACCEPT, AUTHORIZATION]),
        )
}

async fn health(Extension(app_state): Extension<AppState>) -> impl IntoResponse {
    match app_state.store.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            error!("Database health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not_found", "details": "nothing to see here" })),
    )
}
