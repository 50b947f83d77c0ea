#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use club_backend::auth::JwtKeys;
use club_backend::db::MemoryStore;
use club_backend::domain::PollPolicy;
use club_backend::{AppState, build_router};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    keys: JwtKeys,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(PollPolicy::default())
    }

    pub fn with_policy(policy: PollPolicy) -> Self {
        let state = AppState::new(Arc::new(MemoryStore::new()), SECRET, policy);
        TestApp {
            router: build_router(state.clone()),
            state,
            keys: JwtKeys::new(SECRET),
        }
    }

    pub fn token_for(&self, user: Uuid) -> String {
        self.keys.issue(user, Duration::minutes(10)).unwrap()
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token_for(user)),
            );
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: Uuid) -> (StatusCode, Value) {
        self.send("GET", uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: Uuid, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(user), Some(body)).await
    }

    pub async fn create_club(&self, owner: Uuid, name: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/api/clubs",
                owner,
                serde_json::json!({ "name": name, "description": "test club" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().parse().unwrap()
    }
}

pub fn uuid_at(value: &Value, pointer: &str) -> Uuid {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap()
        .parse()
        .unwrap()
}
