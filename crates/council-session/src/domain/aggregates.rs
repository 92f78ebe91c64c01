//! Aggregate root for a collaboration session.

use std::collections::BTreeMap;

use council_core::aggregate::AggregateRoot;
use council_core::clock::Clock;
use council_core::error::DomainError;
use council_core::rng::DeterministicRng;

use super::events::{Joined, Left, MessagePosted, SessionCreated, SessionEvent, SessionEventKind};
use super::reserved::{MODERATOR, ensure_not_reserved};

/// The aggregate root for a session, derived by replaying its log.
///
/// Never persisted directly: every operation replays a fresh copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Aggregate identifier.
    pub id: String,
    /// Every applied event, in log order. An event's ordinal is its index
    /// plus one.
    pub(crate) events: Vec<SessionEvent>,
    /// Display name to "currently active", as of the last `Joined`/`Left`
    /// for that name. Absent means inactive.
    pub(crate) participants: BTreeMap<String, bool>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<SessionEvent>,
}

impl Session {
    /// Creates a new, empty session.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            events: Vec::new(),
            participants: BTreeMap::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Every applied event, in log order.
    #[must_use]
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Number of applied events; also the ordinal of the latest event.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// The raw participant map, including inactive names.
    #[must_use]
    pub fn participants(&self) -> &BTreeMap<String, bool> {
        &self.participants
    }

    /// Active participants in alphabetical order, never including the
    /// moderator.
    #[must_use]
    pub fn active_participants(&self) -> Vec<&str> {
        self.participants
            .iter()
            .filter(|(name, active)| **active && name.as_str() != MODERATOR)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Whether `name` is currently joined.
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.participants.get(name).copied().unwrap_or(false)
    }

    /// The author of the most recent message not written by `excluding`.
    #[must_use]
    pub fn previous_speaker(&self, excluding: &str) -> Option<&str> {
        self.messages()
            .map(|message| message.participant.as_str())
            .find(|participant| *participant != excluding)
    }

    /// The designated next speaker of the most recent message.
    #[must_use]
    pub fn latest_message_next(&self) -> Option<&str> {
        self.messages().next().map(|message| message.next.as_str())
    }

    /// Picks an active participant other than `excluding`, or `None` when
    /// there is no candidate. The choice is drawn from `rng` over the
    /// alphabetically ordered candidates.
    pub fn random_active_participant(
        &self,
        excluding: &str,
        rng: &mut dyn DeterministicRng,
    ) -> Option<&str> {
        let candidates: Vec<&str> = self
            .active_participants()
            .into_iter()
            .filter(|name| *name != excluding)
            .collect();
        let last = candidates.len().checked_sub(1)?;
        let drawn = rng.next_u32_range(0, u32::try_from(last).unwrap_or(u32::MAX));
        let index = usize::try_from(drawn).map_or(last, |index| index.min(last));
        Some(candidates[index])
    }

    /// Resolves who acts after `participant` when no explicit next speaker
    /// was given: the previous speaker if still active, otherwise another
    /// active participant, otherwise the moderator.
    pub fn resolve_next_speaker(
        &self,
        participant: &str,
        rng: &mut dyn DeterministicRng,
    ) -> String {
        if let Some(previous) = self.previous_speaker(participant)
            && self.is_active(previous)
        {
            return previous.to_owned();
        }
        self.random_active_participant(participant, rng)
            .unwrap_or(MODERATOR)
            .to_owned()
    }

    /// Writes the `SessionCreated` event that opens every log.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionAlreadyExists` if the log already holds
    /// events.
    pub fn create(&mut self, clock: &dyn Clock) -> Result<(), DomainError> {
        if !self.events.is_empty() || !self.uncommitted_events.is_empty() {
            return Err(DomainError::SessionAlreadyExists(self.id.clone()));
        }
        let id = self.id.clone();
        self.record(clock, SessionEventKind::SessionCreated(SessionCreated { id }));
        Ok(())
    }

    /// Joins `participant`, producing a `Joined` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ReservedName` for the moderator identity and
    /// `DomainError::NameTaken` if the name is already active.
    pub fn join(&mut self, participant: &str, clock: &dyn Clock) -> Result<(), DomainError> {
        ensure_not_reserved(participant)?;
        if self.is_active(participant) {
            return Err(DomainError::NameTaken(participant.to_owned()));
        }
        self.record(
            clock,
            SessionEventKind::Joined(Joined {
                participant: participant.to_owned(),
            }),
        );
        Ok(())
    }

    /// Removes `participant`, producing a `Left` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ParticipantNotInSession` if the name is not
    /// currently active.
    pub fn leave(&mut self, participant: &str, clock: &dyn Clock) -> Result<(), DomainError> {
        if !self.is_active(participant) {
            return Err(DomainError::ParticipantNotInSession {
                name: participant.to_owned(),
                session_id: self.id.clone(),
            });
        }
        self.record(
            clock,
            SessionEventKind::Left(Left {
                participant: participant.to_owned(),
            }),
        );
        Ok(())
    }

    /// Posts a message, producing a `Message` event with a resolved next
    /// speaker. An empty `next` counts as no explicit choice.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StaleState` unless the log holds exactly
    /// `after_event_num` events, `DomainError::NotAParticipant` if a
    /// non-moderator poster is not active, and
    /// `DomainError::InvalidNextParticipant` if an explicit next speaker is
    /// neither active nor the moderator.
    pub fn post_message(
        &mut self,
        participant: &str,
        content: &str,
        next: Option<&str>,
        after_event_num: usize,
        clock: &dyn Clock,
        rng: &mut dyn DeterministicRng,
    ) -> Result<(), DomainError> {
        if self.event_count() != after_event_num {
            return Err(DomainError::StaleState {
                session_id: self.id.clone(),
                expected: after_event_num,
                actual: self.event_count(),
            });
        }

        if participant != MODERATOR && !self.is_active(participant) {
            return Err(DomainError::NotAParticipant {
                name: participant.to_owned(),
                session_id: self.id.clone(),
            });
        }

        let next = match next.filter(|name| !name.is_empty()) {
            Some(name) if name == MODERATOR || self.is_active(name) => name.to_owned(),
            Some(name) => return Err(DomainError::InvalidNextParticipant(name.to_owned())),
            None => self.resolve_next_speaker(participant, rng),
        };

        self.record(
            clock,
            SessionEventKind::Message(MessagePosted {
                participant: participant.to_owned(),
                content: content.to_owned(),
                next,
            }),
        );
        Ok(())
    }

    /// Message payloads, newest first.
    fn messages(&self) -> impl Iterator<Item = &MessagePosted> {
        self.events.iter().rev().filter_map(|event| match &event.kind {
            SessionEventKind::Message(message) => Some(message),
            _ => None,
        })
    }

    fn record(&mut self, clock: &dyn Clock, kind: SessionEventKind) {
        self.uncommitted_events.push(SessionEvent {
            timestamp_millis: clock.now_millis(),
            kind,
        });
    }
}

impl AggregateRoot for Session {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> usize {
        self.events.len()
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            SessionEventKind::Joined(payload) => {
                self.participants.insert(payload.participant.clone(), true);
            }
            SessionEventKind::Left(payload) => {
                self.participants.insert(payload.participant.clone(), false);
            }
            SessionEventKind::SessionCreated(_) | SessionEventKind::Message(_) => {}
        }
        self.events.push(event.clone());
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
