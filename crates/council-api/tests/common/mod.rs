//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use council_core::clock::Clock;
use council_event_store::{FileEventRepository, SessionPaths};
use council_session::application::command_handlers::{handle_create_session, handle_join_session};
use council_session::domain::commands::{CreateSession, JoinSession};
use council_test_support::{FixedClock, MockRng};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use council_api::routes;
use council_api::state::{AppState, rng_factory};

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> FixedClock {
    FixedClock(chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap())
}

/// Builds a POST request carrying a JSON body.
pub fn json_request(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// A router over a file-backed store in a temporary directory.
pub struct TestApp {
    _dir: TempDir,
    pub repo: Arc<FileEventRepository>,
    pub router: Router,
}

impl TestApp {
    /// Builds the full app router with a real `FileEventRepository` and
    /// deterministic Clock/RNG.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Arc::new(FileEventRepository::new(SessionPaths::new(dir.path())));
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(fixed_clock());
        let app_state = AppState::new(clock, rng_factory(|| MockRng), repo.clone());

        Self {
            _dir: dir,
            repo,
            router: routes::router(app_state),
        }
    }

    /// Creates a session and joins each participant in order.
    pub fn seed_session(&self, session_id: &str, participants: &[&str]) {
        handle_create_session(
            &CreateSession {
                correlation_id: Uuid::new_v4(),
                session_id: session_id.to_owned(),
            },
            &fixed_clock(),
            self.repo.as_ref(),
        )
        .unwrap();
        for participant in participants {
            handle_join_session(
                &JoinSession {
                    correlation_id: Uuid::new_v4(),
                    session_id: session_id.to_owned(),
                    participant: (*participant).to_owned(),
                },
                &fixed_clock(),
                self.repo.as_ref(),
            )
            .unwrap();
        }
    }

    /// Send a POST request with a JSON body and return the response.
    pub async fn post_json(
        &self,
        uri: &str,
        body: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.send(json_request(uri, body)).await
    }

    /// Send a GET request and return the response.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

        (status, json)
    }
}
