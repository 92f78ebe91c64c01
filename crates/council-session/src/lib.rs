//! Council — turn-based collaboration sessions.
//!
//! Responsible for the session event model, replaying a session log into
//! its current state, and the read-modify-append protocol every mutation
//! follows while holding the session's exclusive lock.

pub mod application;
pub mod domain;
