//! Command handlers for collaboration sessions.
//!
//! Every mutation follows the same protocol: take the session's exclusive
//! lock, replay the log as it stands under the lock, validate the command
//! against that state, append the resulting event, release the lock. The
//! lock is a scoped value, so it is released on every exit path.

use council_core::aggregate::AggregateRoot;
use council_core::clock::Clock;
use council_core::command::Command;
use council_core::error::DomainError;
use council_core::repository::{EventRepository, LockedStream};
use council_core::rng::DeterministicRng;
use tracing::{debug, info, warn};

use crate::domain::aggregates::Session;
use crate::domain::commands::{CreateSession, JoinSession, LeaveSession, PostMessage};
use crate::domain::events::{decode_event, encode_event};
use crate::domain::reserved::ensure_not_reserved;

/// Result of a successfully handled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCommandResult {
    /// The session affected by the command.
    pub session_id: String,
    /// 1-indexed ordinal of the event the command appended.
    pub event_number: usize,
}

/// Replays raw log lines into a `Session`.
///
/// Blank lines are skipped. Any other line that fails to decode aborts the
/// replay: state derived from a partial log is not safe to act on.
///
/// # Errors
///
/// Returns `DomainError::MalformedEvent` naming the first undecodable line.
pub fn reconstitute<S: AsRef<str>>(session_id: &str, lines: &[S]) -> Result<Session, DomainError> {
    let mut session = Session::new(session_id);
    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let event = decode_event(line).map_err(|e| DomainError::MalformedEvent {
            session_id: session_id.to_owned(),
            line: index + 1,
            reason: e.to_string(),
        })?;
        session.apply(&event);
    }
    debug!(session_id, events = session.version(), "replayed session log");
    Ok(session)
}

/// Appends the session's uncommitted events and returns the ordinal of the
/// last one.
fn persist(session: &mut Session, stream: &mut dyn LockedStream) -> Result<usize, DomainError> {
    for event in session.uncommitted_events() {
        let line = encode_event(event).map_err(|e| {
            DomainError::Infrastructure(format!("event serialization failed: {e}"))
        })?;
        stream.append_line(&line)?;
    }
    let event_number = session.version() + session.uncommitted_events().len();
    session.clear_uncommitted_events();
    Ok(event_number)
}

fn replay_locked(
    session_id: &str,
    stream: &mut dyn LockedStream,
) -> Result<Session, DomainError> {
    let lines = stream.read_lines()?;
    reconstitute(session_id, &lines)
}

/// Replays a log that must already hold its `session_created` event. A log
/// with no events is left over from an interrupted create and is treated as
/// absent, so nothing is ever appended ahead of the creation event.
fn replay_existing(
    session_id: &str,
    stream: &mut dyn LockedStream,
) -> Result<Session, DomainError> {
    let session = replay_locked(session_id, stream)?;
    if session.event_count() == 0 {
        return Err(DomainError::SessionNotFound(session_id.to_owned()));
    }
    Ok(session)
}

fn log_rejection(command: &dyn Command, session_id: &str, err: &DomainError) {
    warn!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        session_id,
        error = %err,
        "command rejected"
    );
}

/// Handles the `CreateSession` command: creates the log and writes its
/// opening `session_created` event.
///
/// # Errors
///
/// Returns `DomainError::SessionAlreadyExists` if the log already holds
/// events, or a storage error.
pub fn handle_create_session(
    command: &CreateSession,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut stream = repo.create_stream(&command.session_id)?;
    let mut session = replay_locked(&command.session_id, stream.as_mut())?;

    session
        .create(clock)
        .inspect_err(|e| log_rejection(command, &command.session_id, e))?;
    let event_number = persist(&mut session, stream.as_mut())?;

    info!(
        correlation_id = %command.correlation_id,
        session_id = %command.session_id,
        "session created"
    );

    Ok(SessionCommandResult {
        session_id: command.session_id.clone(),
        event_number,
    })
}

/// Handles the `JoinSession` command.
///
/// The returned ordinal is the participant's first optimistic-lock
/// baseline.
///
/// # Errors
///
/// Returns `DomainError::ReservedName` (before touching storage),
/// `DomainError::SessionNotFound`, `DomainError::NameTaken`, or a storage
/// error.
pub fn handle_join_session(
    command: &JoinSession,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    ensure_not_reserved(&command.participant)
        .inspect_err(|e| log_rejection(command, &command.session_id, e))?;

    let mut stream = repo.lock_stream(&command.session_id)?;
    let mut session = replay_existing(&command.session_id, stream.as_mut())?;

    session
        .join(&command.participant, clock)
        .inspect_err(|e| log_rejection(command, &command.session_id, e))?;
    let event_number = persist(&mut session, stream.as_mut())?;

    info!(
        correlation_id = %command.correlation_id,
        session_id = %command.session_id,
        participant = %command.participant,
        event_number,
        "participant joined"
    );

    Ok(SessionCommandResult {
        session_id: command.session_id.clone(),
        event_number,
    })
}

/// Handles the `LeaveSession` command.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound`,
/// `DomainError::ParticipantNotInSession`, or a storage error.
pub fn handle_leave_session(
    command: &LeaveSession,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut stream = repo.lock_stream(&command.session_id)?;
    let mut session = replay_existing(&command.session_id, stream.as_mut())?;

    session
        .leave(&command.participant, clock)
        .inspect_err(|e| log_rejection(command, &command.session_id, e))?;
    let event_number = persist(&mut session, stream.as_mut())?;

    info!(
        correlation_id = %command.correlation_id,
        session_id = %command.session_id,
        participant = %command.participant,
        event_number,
        "participant left"
    );

    Ok(SessionCommandResult {
        session_id: command.session_id.clone(),
        event_number,
    })
}

/// Handles the `PostMessage` command.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound`, `DomainError::StaleState`,
/// `DomainError::NotAParticipant`, `DomainError::InvalidNextParticipant`,
/// or a storage error.
pub fn handle_post_message(
    command: &PostMessage,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut stream = repo.lock_stream(&command.session_id)?;
    let mut session = replay_existing(&command.session_id, stream.as_mut())?;

    session
        .post_message(
            &command.participant,
            &command.content,
            command.next.as_deref(),
            command.after_event_num,
            clock,
            rng,
        )
        .inspect_err(|e| log_rejection(command, &command.session_id, e))?;
    let event_number = persist(&mut session, stream.as_mut())?;

    info!(
        correlation_id = %command.correlation_id,
        session_id = %command.session_id,
        participant = %command.participant,
        event_number,
        "message posted"
    );

    Ok(SessionCommandResult {
        session_id: command.session_id.clone(),
        event_number,
    })
}
