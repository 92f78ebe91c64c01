//! Route modules and the assembled application router.

pub mod health;
pub mod session;

use axum::Router;
use council_core::error::DomainError;

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the application router: `/health` plus the session routes under
/// `/api`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api", session::router())
        .with_state(state)
}

/// Runs blocking session work (file locks, file I/O) off the async
/// executor.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("blocking task failed: {e}")))?;
    Ok(result?)
}
