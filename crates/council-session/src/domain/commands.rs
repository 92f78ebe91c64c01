//! Commands for a collaboration session.

use council_core::command::Command;
use uuid::Uuid;

/// Command to bring a new session log into existence.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
}

impl Command for CreateSession {
    fn command_type(&self) -> &'static str {
        "session.create"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to join a session under a display name.
#[derive(Debug, Clone)]
pub struct JoinSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
    /// The display name to join as.
    pub participant: String,
}

impl Command for JoinSession {
    fn command_type(&self) -> &'static str {
        "session.join"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to leave a session.
#[derive(Debug, Clone)]
pub struct LeaveSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
    /// The display name leaving.
    pub participant: String,
}

impl Command for LeaveSession {
    fn command_type(&self) -> &'static str {
        "session.leave"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to post a message, guarded by the caller's view of the log.
#[derive(Debug, Clone)]
pub struct PostMessage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
    /// Who is posting.
    pub participant: String,
    /// The message body.
    pub content: String,
    /// Explicit next speaker; resolved automatically when `None`.
    pub next: Option<String>,
    /// The event count the caller last observed. The post is rejected
    /// unless the log still holds exactly this many events.
    pub after_event_num: usize,
}

impl Command for PostMessage {
    fn command_type(&self) -> &'static str {
        "session.post_message"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
