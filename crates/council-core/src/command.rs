//! Command abstractions.
//!
//! A command is a request to mutate one session log. Handlers log its type
//! and correlation id on every outcome, so one command can be followed
//! through the lock, replay and append steps.

use uuid::Uuid;

/// Trait that all session commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable name logged as the `command` field, e.g. `"session.post_message"`.
    fn command_type(&self) -> &'static str;

    /// Identifier shared by every log line emitted while handling this
    /// command.
    fn correlation_id(&self) -> Uuid;
}
