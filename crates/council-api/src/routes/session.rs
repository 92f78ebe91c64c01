//! Session routes: status, participants and moderator posts.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use council_core::error::DomainError;
use council_session::application::query_handlers::{ParticipantsView, SessionStatusView};
use council_session::application::{command_handlers, query_handlers};
use council_session::domain::commands;
use council_session::domain::reserved::MODERATOR;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::run_blocking;
use crate::state::AppState;

/// Query string for `GET /status`.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub session: Option<String>,
    /// Only events numbered above this are listed.
    #[serde(default)]
    pub after: usize,
}

/// Query string for `GET /participants`.
#[derive(Debug, Deserialize)]
pub struct ParticipantsQuery {
    pub session: Option<String>,
}

/// Request body for `POST /post`.
#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub session: String,
    pub content: String,
    /// The event count the poster last saw.
    #[serde(default)]
    pub after: usize,
    #[serde(default)]
    pub next: Option<String>,
}

/// Response body returned after a post is accepted.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// Ordinal of the new message.
    pub event_number: usize,
}

fn required_session(session: Option<String>) -> Result<String, ApiError> {
    session
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DomainError::Validation("session parameter required".to_owned()).into())
}

/// GET /status
#[instrument(skip(state, query), fields(session_id = ?query.session, after = query.after))]
async fn get_status(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatusQuery>,
) -> Result<Json<SessionStatusView>, ApiError> {
    let after = query.after;
    let session_id = required_session(query.session)?;
    let repo = Arc::clone(&state.event_repository);

    let view = run_blocking(move || {
        query_handlers::get_session_status(&session_id, after, repo.as_ref())
    })
    .await?;

    Ok(Json(view))
}

/// GET /participants
#[instrument(skip(state, query), fields(session_id = ?query.session))]
async fn get_participants(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ParticipantsQuery>,
) -> Result<Json<ParticipantsView>, ApiError> {
    let session_id = required_session(query.session)?;
    let repo = Arc::clone(&state.event_repository);

    let view =
        run_blocking(move || query_handlers::get_participants(&session_id, repo.as_ref())).await?;

    Ok(Json(view))
}

/// POST /post
///
/// Always posts as the moderator.
#[instrument(skip(state, request), fields(session_id = %request.session, after = request.after))]
async fn post_message(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    if request.session.is_empty() {
        return Err(DomainError::Validation("session field required".to_owned()).into());
    }
    if request.content.is_empty() {
        return Err(DomainError::Validation("content field required".to_owned()).into());
    }

    let command = commands::PostMessage {
        correlation_id: Uuid::new_v4(),
        session_id: request.session,
        participant: MODERATOR.to_owned(),
        content: request.content,
        next: request.next,
        after_event_num: request.after,
    };

    info!(correlation_id = %command.correlation_id, "handling post_message command");

    let AppState {
        clock,
        rng_factory,
        event_repository,
    } = state;
    let result = run_blocking(move || {
        let mut rng = rng_factory();
        command_handlers::handle_post_message(
            &command,
            clock.as_ref(),
            &mut *rng,
            event_repository.as_ref(),
        )
    })
    .await?;

    Ok(Json(PostResponse {
        event_number: result.event_number,
    }))
}

/// Returns the router for session routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/post", post(post_message))
        .route("/participants", get(get_participants))
}
