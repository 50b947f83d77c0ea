mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use club_backend::ClubError;
use club_backend::db::{MembershipStore, PollStore};
use common::{TestApp, uuid_at};
use futures::future::join_all;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn join_then_join_again_is_already_member() {
    let app = TestApp::new();
    let club = app.create_club(Uuid::new_v4(), "Chess").await;
    let user = Uuid::new_v4();
    let uri = format!("/api/clubs/{club}/join");

    let (status, body) = app.post(&uri, user, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app.post(&uri, user, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_member");
    assert_eq!(body["details"], "Already a member");
}

#[tokio::test]
async fn leave_after_join_and_leave_without_join() {
    let app = TestApp::new();
    let club = app.create_club(Uuid::new_v4(), "Book club").await;
    let user = Uuid::new_v4();

    let (status, body) = app
        .post(&format!("/api/clubs/{club}/leave"), user, json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not_member");

    app.post(&format!("/api/clubs/{club}/join"), user, json!({}))
        .await;
    let (status, _) = app
        .post(&format!("/api/clubs/{club}/leave"), user, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = app.get(&format!("/api/clubs/{club}"), user).await;
    assert_eq!(detail["memberCount"], 1);
}

#[tokio::test]
async fn club_detail_lists_creator_as_admin() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let club = app.create_club(owner, "Robotics").await;

    let (status, body) = app.get(&format!("/api/clubs/{club}"), owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Robotics");
    assert_eq!(body["isPublic"], true);
    assert_eq!(body["members"][0]["userId"], owner.to_string());
    assert_eq!(body["members"][0]["role"], "admin");
}

#[tokio::test]
async fn duplicate_club_name_conflicts() {
    let app = TestApp::new();
    app.create_club(Uuid::new_v4(), "Debate").await;

    let (status, body) = app
        .post("/api/clubs", Uuid::new_v4(), json!({ "name": "Debate" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "club_name_taken");
}

#[tokio::test]
async fn unknown_club_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            &format!("/api/clubs/{}/join", Uuid::new_v4()),
            Uuid::new_v4(),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"], "Club not found");
}

#[tokio::test]
async fn requests_without_a_valid_token_are_unauthenticated() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api/clubs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");

    let (status, _) = app
        .send("POST", "/api/clubs", None, Some(json!({ "name": "Ghosts" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_does_not_require_auth() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_joins_leave_one_membership() {
    let app = TestApp::new();
    let club = app.create_club(Uuid::new_v4(), "Climbing").await;
    let user = Uuid::new_v4();

    let attempts = (0..16).map(|_| {
        let ledger = app.state.clubs.clone();
        tokio::spawn(async move { ledger.join(club, user).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ClubError::AlreadyMember))
    );

    let members = app.state.clubs.members(club).await.unwrap();
    assert_eq!(members.iter().filter(|m| m.user_id == user).count(), 1);
}

#[tokio::test]
async fn malformed_club_body_is_invalid_request() {
    let app = TestApp::new();
    let user = Uuid::new_v4();

    let (status, body) = app
        .post("/api/clubs", user, json!({ "description": "no name" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let (status, body) = app.send("POST", "/api/clubs", Some(user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn club_can_be_updated() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let club = app.create_club(owner, "Sailing").await;
    app.create_club(owner, "Rowing").await;
    let uri = format!("/api/clubs/{club}");

    let (status, body) = app
        .send(
            "PATCH",
            &uri,
            Some(owner),
            Some(json!({ "description": "Harbour trips", "isPublic": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["name"], "Sailing");
    assert_eq!(body["description"], "Harbour trips");
    assert_eq!(body["isPublic"], false);
    assert_eq!(body["memberCount"], 1);

    let (status, body) = app
        .send("PATCH", &uri, Some(owner), Some(json!({ "name": "Rowing" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "club_name_taken");
}

#[tokio::test]
async fn deleting_a_club_removes_everything_it_owns() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let member = Uuid::new_v4();
    let club = app.create_club(owner, "Orchestra").await;
    let (status, _) = app
        .post(&format!("/api/clubs/{club}/join"), member, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, poll) = app
        .post(
            &format!("/api/clubs/{club}/polls"),
            owner,
            json!({
                "question": "Next piece?",
                "endsAt": (Utc::now() + Duration::days(1)).to_rfc3339(),
                "options": [{ "text": "Bolero" }]
            }),
        )
        .await;
    let poll_id = uuid_at(&poll, "/id");
    let option_id = uuid_at(&poll, "/options/0/id");
    let vote_uri = format!("/api/clubs/{club}/polls/{poll_id}/vote");
    let (status, _) = app
        .post(&vote_uri, member, json!({ "optionId": option_id }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send("DELETE", &format!("/api/clubs/{club}"), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for uri in [
        format!("/api/clubs/{club}"),
        format!("/api/clubs/{club}/members"),
        format!("/api/clubs/{club}/polls/{poll_id}"),
        format!("/api/clubs/{club}/polls/{poll_id}/tally"),
    ] {
        let (status, body) = app.get(&uri, member).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "not_found");
    }

    let (status, body) = app
        .post(&vote_uri, member, json!({ "optionId": option_id }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"], "Club not found");

    let store = &app.state.store;
    assert!(store.get_poll(poll_id).await.unwrap().is_none());
    assert!(store.get_option(option_id).await.unwrap().is_none());
    assert!(store.find_membership(club, member).await.unwrap().is_none());

    let (status, _) = app
        .send("DELETE", &format!("/api/clubs/{club}"), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
