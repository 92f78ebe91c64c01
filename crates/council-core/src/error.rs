//! Domain error types.
//!
//! Every variant renders a stable message naming the offending session,
//! participant or event ordinal so that automated callers can match on it.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The session log does not exist.
    #[error("Session '{0}' not found. Run 'council new' to create a session.")]
    SessionNotFound(String),

    /// A session log already holds events and cannot be created again.
    #[error("Session '{0}' already exists.")]
    SessionAlreadyExists(String),

    /// A join used a name that is already active in the session.
    #[error("Participant '{0}' already exists in this session. Choose a different name.")]
    NameTaken(String),

    /// A join used the reserved moderator identity.
    #[error("'{0}' is a reserved name. Choose a different name.")]
    ReservedName(String),

    /// Optimistic concurrency conflict on post.
    #[error(
        "New activity since event #{expected}. Re-read with 'council status {session_id} --after {expected}' before posting."
    )]
    StaleState {
        /// The session that had the conflict.
        session_id: String,
        /// The event count the caller based its post on.
        expected: usize,
        /// The event count found under the lock.
        actual: usize,
    },

    /// A post came from a name that has not joined or has left.
    #[error("'{name}' must join the session before posting. Run 'council join {session_id}'.")]
    NotAParticipant {
        /// The rejected participant name.
        name: String,
        /// The session posted to.
        session_id: String,
    },

    /// A leave came from a name that is not currently active.
    #[error("'{name}' is not a participant in session '{session_id}'.")]
    ParticipantNotInSession {
        /// The rejected participant name.
        name: String,
        /// The session left.
        session_id: String,
    },

    /// An explicit next speaker is neither active nor the moderator.
    #[error(
        "'{0}' is not an active participant. Use --next with an active participant or 'Moderator'."
    )]
    InvalidNextParticipant(String),

    /// A log line failed to decode; replay is aborted.
    #[error("malformed event on line {line} of session '{session_id}': {reason}")]
    MalformedEvent {
        /// The session whose log is corrupt.
        session_id: String,
        /// 1-indexed line number within the log.
        line: usize,
        /// Decoder diagnostic.
        reason: String,
    },

    /// The await loop reached its deadline before the participant's turn.
    #[error("Timed out waiting for {participant}'s turn in session '{session_id}' after {waited_secs} seconds.")]
    TurnTimeout {
        /// The session being watched.
        session_id: String,
        /// The participant waiting for the turn.
        participant: String,
        /// How long the loop waited.
        waited_secs: u64,
    },

    /// A validation error on caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
