mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use club_backend::ClubError;
use club_backend::domain::NewEvent;
use common::{TestApp, uuid_at};
use futures::future::join_all;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn create_and_join_event() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let club = app.create_club(owner, "Running").await;
    let start = Utc::now() + Duration::days(2);

    let (status, event) = app
        .post(
            &format!("/api/clubs/{club}/events"),
            owner,
            json!({
                "title": "Park run",
                "description": "5k loop",
                "startDate": start.to_rfc3339(),
                "endDate": (start + Duration::hours(1)).to_rfc3339(),
                "location": "North gate"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{event}");
    assert_eq!(event["createdBy"], owner.to_string());
    assert_eq!(event["attendees"], json!([]));

    let event_id = uuid_at(&event, "/id");
    let runner = Uuid::new_v4();
    let join_uri = format!("/api/clubs/{club}/events/{event_id}/join");

    let (status, _) = app.post(&join_uri, runner, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post(&join_uri, runner, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_attending");

    let (_, events) = app.get(&format!("/api/clubs/{club}/events"), runner).await;
    assert_eq!(events[0]["attendees"], json!([runner.to_string()]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_event_joins_leave_one_attendance() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let club = app.create_club(owner, "Hiking").await;
    let start = Utc::now() + Duration::days(3);
    let event = app
        .state
        .events
        .create_event(
            club,
            owner,
            NewEvent {
                title: "Ridge walk".into(),
                description: String::new(),
                start_date: start,
                end_date: start + Duration::hours(5),
                location: None,
            },
        )
        .await
        .unwrap();
    let event_id = event.event.id;
    let hiker = Uuid::new_v4();

    let attempts = (0..16).map(|_| {
        let ledger = app.state.events.clone();
        tokio::spawn(async move { ledger.join_event(club, event_id, hiker).await })
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
            .all(|e| matches!(e, ClubError::AlreadyAttending))
    );

    let event = app.state.events.get_event(club, event_id).await.unwrap();
    assert_eq!(event.attendees, vec![hiker]);
}

#[tokio::test]
async fn event_ending_before_it_starts_is_rejected() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let club = app.create_club(owner, "Cycling").await;
    let start = Utc::now() + Duration::days(1);

    let (status, body) = app
        .post(
            &format!("/api/clubs/{club}/events"),
            owner,
            json!({
                "title": "Night ride",
                "startDate": start.to_rfc3339(),
                "endDate": (start - Duration::hours(1)).to_rfc3339()
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let (status, body) = app
        .post(
            &format!("/api/clubs/{club}/events"),
            owner,
            json!({ "title": "No dates" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn messages_are_returned_newest_first() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let club = app.create_club(owner, "Photography").await;
    let uri = format!("/api/clubs/{club}/messages");

    let (status, first) = app.post(&uri, owner, json!({ "content": "hello" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["type"], "text");

    let (status, second) = app
        .post(
            &uri,
            owner,
            json!({ "content": "https://example.com/shot.jpg", "type": "image" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["clubId"], club.to_string());

    let (status, history) = app.get(&uri, owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history[0]["id"], second["id"]);
    assert_eq!(history[1]["id"], first["id"]);
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let club = app.create_club(owner, "Knitting").await;

    let (status, body) = app
        .post(
            &format!("/api/clubs/{club}/messages"),
            owner,
            json!({ "content": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}
