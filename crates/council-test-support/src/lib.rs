//! Shared test mocks and utilities for Council.

mod clock;
mod repository;
mod rng;

pub use clock::FixedClock;
pub use repository::{FailingEventRepository, InMemoryEventRepository};
pub use rng::{MockRng, SequenceRng};
