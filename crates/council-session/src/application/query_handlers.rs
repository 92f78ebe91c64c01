//! Query handlers for collaboration sessions.
//!
//! Reads replay the log without taking the session lock. A read racing an
//! append may miss the line being written, never a committed one.

use std::thread;
use std::time::{Duration, Instant};

use council_core::error::DomainError;
use council_core::event::DomainEvent;
use council_core::repository::EventRepository;
use serde::Serialize;
use tracing::debug;

use crate::application::command_handlers;
use crate::domain::aggregates::Session;
use crate::domain::events::{SessionEvent, SessionEventKind};

/// Default upper bound on how long `await_turn` waits.
pub const DEFAULT_AWAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default pause between `await_turn` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// One event as presented to readers, numbered by its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    /// 1-indexed ordinal.
    pub number: usize,
    /// Event type identifier.
    #[serde(rename = "type")]
    pub event_type: &'static str,
    /// Milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Session id, present on `session_created` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl EventView {
    fn from_event(number: usize, event: &SessionEvent) -> Self {
        let mut view = Self {
            number,
            event_type: event.event_type(),
            timestamp_millis: event.timestamp_millis,
            participant: event.participant().map(str::to_owned),
            content: None,
            next: None,
            id: None,
        };
        match &event.kind {
            SessionEventKind::SessionCreated(created) => view.id = Some(created.id.clone()),
            SessionEventKind::Message(message) => {
                view.content = Some(message.content.clone());
                view.next = Some(message.next.clone());
            }
            SessionEventKind::Joined(_) | SessionEventKind::Left(_) => {}
        }
        view
    }
}

/// Read-only view of a session: its active roster and the events after a
/// watermark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatusView {
    pub session_id: String,
    /// Active participants, alphabetical, excluding the moderator.
    pub participants: Vec<String>,
    /// Total events in the log, regardless of the watermark.
    pub event_count: usize,
    /// Events numbered strictly greater than the watermark.
    pub events: Vec<EventView>,
}

/// Active roster of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantsView {
    pub participants: Vec<String>,
}

/// Tuning for [`await_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for AwaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_AWAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Loads and replays a session without locking.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if the session does not exist or
/// its log holds no events, `DomainError::MalformedEvent` if a line cannot
/// be decoded, or a storage error.
pub fn load_session(session_id: &str, repo: &dyn EventRepository) -> Result<Session, DomainError> {
    let lines = repo.load_lines(session_id)?;
    let session = command_handlers::reconstitute(session_id, &lines)?;
    if session.event_count() == 0 {
        return Err(DomainError::SessionNotFound(session_id.to_owned()));
    }
    Ok(session)
}

/// Builds the status view of an already replayed session.
#[must_use]
pub fn session_status(session: &Session, after: usize) -> SessionStatusView {
    let events = session
        .events()
        .iter()
        .enumerate()
        .map(|(index, event)| (index + 1, event))
        .filter(|(number, _)| *number > after)
        .map(|(number, event)| EventView::from_event(number, event))
        .collect();

    SessionStatusView {
        session_id: session.id.clone(),
        participants: owned_roster(session),
        event_count: session.event_count(),
        events,
    }
}

/// Retrieves a session's status, listing only events after `after`.
///
/// # Errors
///
/// See [`load_session`].
pub fn get_session_status(
    session_id: &str,
    after: usize,
    repo: &dyn EventRepository,
) -> Result<SessionStatusView, DomainError> {
    let session = load_session(session_id, repo)?;
    Ok(session_status(&session, after))
}

/// Retrieves a session's active roster.
///
/// # Errors
///
/// See [`load_session`].
pub fn get_participants(
    session_id: &str,
    repo: &dyn EventRepository,
) -> Result<ParticipantsView, DomainError> {
    let session = load_session(session_id, repo)?;
    Ok(ParticipantsView {
        participants: owned_roster(&session),
    })
}

/// Blocks until a message designates `participant` as the next speaker,
/// returning the session as it stood at that point.
///
/// Only events beyond the watermark count. The watermark starts at `after`
/// and advances to the current event count whenever new events arrive
/// without handing `participant` the turn.
///
/// # Errors
///
/// Returns `DomainError::TurnTimeout` once `options.timeout` has elapsed,
/// or any error from [`load_session`]. A timeout too large to represent as
/// a deadline waits indefinitely.
pub fn await_turn(
    session_id: &str,
    participant: &str,
    after: usize,
    options: &AwaitOptions,
    repo: &dyn EventRepository,
) -> Result<Session, DomainError> {
    let deadline = Instant::now().checked_add(options.timeout);
    let mut watermark = after;

    loop {
        let now = Instant::now();
        if let Some(deadline) = deadline
            && now >= deadline
        {
            return Err(DomainError::TurnTimeout {
                session_id: session_id.to_owned(),
                participant: participant.to_owned(),
                waited_secs: options.timeout.as_secs(),
            });
        }

        let session = load_session(session_id, repo)?;
        if session.event_count() > watermark {
            if session.latest_message_next() == Some(participant) {
                debug!(session_id, participant, event_count = session.event_count(), "turn reached");
                return Ok(session);
            }
            watermark = session.event_count();
        }

        let pause = deadline.map_or(options.poll_interval, |deadline| {
            options.poll_interval.min(deadline.saturating_duration_since(now))
        });
        thread::sleep(pause);
    }
}

fn owned_roster(session: &Session) -> Vec<String> {
    session
        .active_participants()
        .into_iter()
        .map(str::to_owned)
        .collect()
}
