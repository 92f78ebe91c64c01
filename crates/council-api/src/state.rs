//! Shared application state.

use std::sync::Arc;

use council_core::clock::Clock;
use council_core::repository::EventRepository;
use council_core::rng::DeterministicRng;

/// Builds the RNG for one request. Each post owns its generator so that no
/// guard is held while the handler waits on a session lock.
pub type RngFactory = Arc<dyn Fn() -> Box<dyn DeterministicRng> + Send + Sync>;

/// Wraps a constructor into an [`RngFactory`].
#[must_use]
pub fn rng_factory<R, F>(make: F) -> RngFactory
where
    R: DeterministicRng + 'static,
    F: Fn() -> R + Send + Sync + 'static,
{
    Arc::new(move || -> Box<dyn DeterministicRng> { Box::new(make()) })
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used to timestamp events.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Source of RNGs for fallback next-speaker selection.
    pub rng_factory: RngFactory,
    /// Session log storage.
    pub event_repository: Arc<dyn EventRepository>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng_factory: RngFactory,
        event_repository: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            clock,
            rng_factory,
            event_repository,
        }
    }
}
