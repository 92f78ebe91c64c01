//! Application layer: command handlers and read-side queries.

pub mod command_handlers;
pub mod query_handlers;
