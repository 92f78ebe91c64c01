//! Domain layer: events, the session aggregate and its commands.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod reserved;
pub mod session_id;
