//! Council API — HTTP surface over session logs.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
