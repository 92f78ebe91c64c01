//! Subcommand implementations over an injected store, clock and RNG.

use anyhow::Result;
use council_core::clock::Clock;
use council_core::error::DomainError;
use council_core::repository::EventRepository;
use council_core::rng::DeterministicRng;
use council_session::application::query_handlers::{self, AwaitOptions};
use council_session::application::command_handlers;
use council_session::domain::commands::{CreateSession, JoinSession, LeaveSession, PostMessage};
use council_session::domain::session_id::generate_session_id;
use uuid::Uuid;

use crate::format::format_status;

/// Fresh identifiers drawn before giving up on collisions.
const MAX_ID_ATTEMPTS: usize = 3;

/// Arguments of `council post`.
pub struct PostArgs {
    pub session_id: String,
    pub participant: String,
    pub content: String,
    pub next: Option<String>,
    pub after: usize,
}

/// Creates a session under a generated identifier and returns it.
pub fn new_session(
    repo: &dyn EventRepository,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
) -> Result<String> {
    let mut attempt = 1;
    loop {
        let command = CreateSession {
            correlation_id: Uuid::new_v4(),
            session_id: generate_session_id(rng),
        };
        match command_handlers::handle_create_session(&command, clock, repo) {
            Ok(result) => return Ok(result.session_id),
            Err(DomainError::SessionAlreadyExists(_)) if attempt < MAX_ID_ATTEMPTS => attempt += 1,
            Err(err) => return Err(err.into()),
        }
    }
}

/// Joins a session, returning the participant's first baseline.
pub fn join(
    repo: &dyn EventRepository,
    clock: &dyn Clock,
    session_id: &str,
    participant: &str,
) -> Result<usize> {
    let command = JoinSession {
        correlation_id: Uuid::new_v4(),
        session_id: session_id.to_owned(),
        participant: participant.to_owned(),
    };
    Ok(command_handlers::handle_join_session(&command, clock, repo)?.event_number)
}

/// Leaves a session. The name can join again later.
pub fn leave(
    repo: &dyn EventRepository,
    clock: &dyn Clock,
    session_id: &str,
    participant: &str,
) -> Result<()> {
    let command = LeaveSession {
        correlation_id: Uuid::new_v4(),
        session_id: session_id.to_owned(),
        participant: participant.to_owned(),
    };
    command_handlers::handle_leave_session(&command, clock, repo)?;
    Ok(())
}

/// Posts a message, returning its ordinal.
pub fn post(
    repo: &dyn EventRepository,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
    args: &PostArgs,
) -> Result<usize> {
    let command = PostMessage {
        correlation_id: Uuid::new_v4(),
        session_id: args.session_id.clone(),
        participant: args.participant.clone(),
        content: args.content.clone(),
        next: args.next.clone(),
        after_event_num: args.after,
    };
    Ok(command_handlers::handle_post_message(&command, clock, rng, repo)?.event_number)
}

/// Renders the transcript of events after `after`.
pub fn status(repo: &dyn EventRepository, session_id: &str, after: usize) -> Result<String> {
    let session = query_handlers::load_session(session_id, repo)?;
    Ok(format_status(&session, after))
}

/// Waits for `participant`'s turn, then renders everything after `after`.
pub fn await_status(
    repo: &dyn EventRepository,
    session_id: &str,
    participant: &str,
    after: usize,
    options: &AwaitOptions,
) -> Result<String> {
    let session = query_handlers::await_turn(session_id, participant, after, options, repo)?;
    Ok(format_status(&session, after))
}
