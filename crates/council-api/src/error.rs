//! Council API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use council_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A configuration variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            DomainError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            DomainError::SessionAlreadyExists(_) => {
                (StatusCode::CONFLICT, "session_already_exists")
            }
            DomainError::NameTaken(_) => (StatusCode::CONFLICT, "name_taken"),
            DomainError::StaleState { .. } => (StatusCode::CONFLICT, "stale_state"),
            DomainError::ReservedName(_) => (StatusCode::BAD_REQUEST, "reserved_name"),
            DomainError::InvalidNextParticipant(_) => {
                (StatusCode::BAD_REQUEST, "invalid_next_participant")
            }
            DomainError::ParticipantNotInSession { .. } => {
                (StatusCode::BAD_REQUEST, "participant_not_in_session")
            }
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::NotAParticipant { .. } => (StatusCode::FORBIDDEN, "not_a_participant"),
            DomainError::TurnTimeout { .. } => (StatusCode::REQUEST_TIMEOUT, "turn_timeout"),
            DomainError::MalformedEvent { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "malformed_event")
            }
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            error!(error = %self.0, error_code, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
