//! Domain events for a collaboration session and their line encoding.
//!
//! Each event is stored as one JSON object per line: a `type`
//! discriminant, a `timestamp_millis` field, and the fields of the
//! matching payload.

use council_core::event::DomainEvent;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Emitted once, first, when a session log is brought into existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCreated {
    /// The session identifier.
    pub id: String,
}

/// Emitted when a participant joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joined {
    /// The participant's display name.
    pub participant: String,
}

/// Emitted when a participant leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Left {
    /// The participant's display name.
    pub participant: String,
}

/// Emitted when a message is posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePosted {
    /// Who posted the message.
    pub participant: String,
    /// The message body.
    pub content: String,
    /// Who is designated to act after this message.
    pub next: String,
}

/// Event type identifier for [`SessionCreated`].
pub const SESSION_CREATED_EVENT_TYPE: &str = "session_created";

/// Event type identifier for [`Joined`].
pub const JOINED_EVENT_TYPE: &str = "joined";

/// Event type identifier for [`Left`].
pub const LEFT_EVENT_TYPE: &str = "left";

/// Event type identifier for [`MessagePosted`].
pub const MESSAGE_EVENT_TYPE: &str = "message";

/// Event payload variants for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    /// The session was created.
    SessionCreated(SessionCreated),
    /// A participant joined.
    Joined(Joined),
    /// A participant left.
    Left(Left),
    /// A message was posted.
    Message(MessagePosted),
}

/// Domain event envelope for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl SessionEvent {
    /// The participant this event is about, if any.
    #[must_use]
    pub fn participant(&self) -> Option<&str> {
        match &self.kind {
            SessionEventKind::SessionCreated(_) => None,
            SessionEventKind::Joined(Joined { participant })
            | SessionEventKind::Left(Left { participant })
            | SessionEventKind::Message(MessagePosted { participant, .. }) => Some(participant),
        }
    }
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            SessionEventKind::SessionCreated(_) => SESSION_CREATED_EVENT_TYPE,
            SessionEventKind::Joined(_) => JOINED_EVENT_TYPE,
            SessionEventKind::Left(_) => LEFT_EVENT_TYPE,
            SessionEventKind::Message(_) => MESSAGE_EVENT_TYPE,
        }
    }

    fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }
}

/// Why a log line could not be decoded.
#[derive(Debug, Error)]
pub enum EventDecodeError {
    /// The line is not a JSON object with `type` and `timestamp_millis`.
    #[error("invalid event envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    /// The discriminant names no known event.
    #[error("unknown event type: {0}")]
    UnknownType(String),

    /// The fields do not match the shape the discriminant requires.
    #[error("failed to parse {event_type} event: {source}")]
    InvalidPayload {
        /// The discriminant that was read.
        event_type: &'static str,
        /// The underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Serialize)]
struct WireEvent<'a, P: Serialize> {
    #[serde(rename = "type")]
    event_type: &'static str,
    timestamp_millis: i64,
    #[serde(flatten)]
    payload: &'a P,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    event_type: String,
    timestamp_millis: i64,
}

/// Encodes an event as a single JSON line, without the line terminator.
///
/// # Errors
///
/// Returns the serializer error; plain string payloads never produce one in
/// practice.
pub fn encode_event(event: &SessionEvent) -> Result<String, serde_json::Error> {
    let event_type = event.event_type();
    let timestamp_millis = event.timestamp_millis;
    match &event.kind {
        SessionEventKind::SessionCreated(payload) => {
            to_line(event_type, timestamp_millis, payload)
        }
        SessionEventKind::Joined(payload) => to_line(event_type, timestamp_millis, payload),
        SessionEventKind::Left(payload) => to_line(event_type, timestamp_millis, payload),
        SessionEventKind::Message(payload) => to_line(event_type, timestamp_millis, payload),
    }
}

fn to_line<P: Serialize>(
    event_type: &'static str,
    timestamp_millis: i64,
    payload: &P,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&WireEvent {
        event_type,
        timestamp_millis,
        payload,
    })
}

/// Decodes one log line, reading the discriminant first and then the
/// payload shape it names.
///
/// # Errors
///
/// Returns `EventDecodeError` if the line is not valid JSON, names an
/// unknown event type, or lacks a field its type requires.
pub fn decode_event(line: &str) -> Result<SessionEvent, EventDecodeError> {
    let envelope: Envelope =
        serde_json::from_str(line).map_err(EventDecodeError::InvalidEnvelope)?;

    let kind = match envelope.event_type.as_str() {
        SESSION_CREATED_EVENT_TYPE => {
            SessionEventKind::SessionCreated(payload(line, SESSION_CREATED_EVENT_TYPE)?)
        }
        JOINED_EVENT_TYPE => SessionEventKind::Joined(payload(line, JOINED_EVENT_TYPE)?),
        LEFT_EVENT_TYPE => SessionEventKind::Left(payload(line, LEFT_EVENT_TYPE)?),
        MESSAGE_EVENT_TYPE => SessionEventKind::Message(payload(line, MESSAGE_EVENT_TYPE)?),
        _ => return Err(EventDecodeError::UnknownType(envelope.event_type)),
    };

    Ok(SessionEvent {
        timestamp_millis: envelope.timestamp_millis,
        kind,
    })
}

fn payload<T: DeserializeOwned>(
    line: &str,
    event_type: &'static str,
) -> Result<T, EventDecodeError> {
    serde_json::from_str(line).map_err(|source| EventDecodeError::InvalidPayload { event_type, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn message(next: &str) -> SessionEvent {
        SessionEvent {
            timestamp_millis: 1_768_471_200_000,
            kind: SessionEventKind::Message(MessagePosted {
                participant: "Alice".to_owned(),
                content: "line one\nline \"two\"".to_owned(),
                next: next.to_owned(),
            }),
        }
    }

    #[test]
    fn test_every_shape_survives_encode_then_decode() {
        let events = vec![
            SessionEvent {
                timestamp_millis: 1,
                kind: SessionEventKind::SessionCreated(SessionCreated {
                    id: "boldly-quiet-lynx".to_owned(),
                }),
            },
            SessionEvent {
                timestamp_millis: 2,
                kind: SessionEventKind::Joined(Joined {
                    participant: "Alice".to_owned(),
                }),
            },
            SessionEvent {
                timestamp_millis: 3,
                kind: SessionEventKind::Left(Left {
                    participant: "Alice".to_owned(),
                }),
            },
            message("Bob"),
        ];

        for event in events {
            let line = encode_event(&event).unwrap();
            assert!(!line.contains('\n'), "encoded event spans lines: {line}");
            assert_eq!(decode_event(&line).unwrap(), event);
        }
    }

    #[test]
    fn test_message_wire_fields() {
        let line = encode_event(&message("Bob")).unwrap();
        let json: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(json["type"], "message");
        assert_eq!(json["timestamp_millis"], 1_768_471_200_000_i64);
        assert_eq!(json["participant"], "Alice");
        assert_eq!(json["next"], "Bob");
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_session_created_wire_fields() {
        let event = SessionEvent {
            timestamp_millis: 10,
            kind: SessionEventKind::SessionCreated(SessionCreated { id: "s".to_owned() }),
        };
        let json: Value = serde_json::from_str(&encode_event(&event).unwrap()).unwrap();

        assert_eq!(json, serde_json::json!({"type": "session_created", "timestamp_millis": 10, "id": "s"}));
    }

    #[test]
    fn test_decode_accepts_hand_written_line() {
        let event =
            decode_event(r#"{"type":"joined","timestamp_millis":1700000000000,"participant":"Bob"}"#)
                .unwrap();

        assert_eq!(event.timestamp_millis, 1_700_000_000_000);
        assert_eq!(event.participant(), Some("Bob"));
        assert_eq!(event.event_type(), JOINED_EVENT_TYPE);
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        match decode_event(r#"{"type":"renamed","timestamp_millis":1,"participant":"Bob"}"#) {
            Err(EventDecodeError::UnknownType(t)) => assert_eq!(t, "renamed"),
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_payload_missing_required_field() {
        match decode_event(r#"{"type":"message","timestamp_millis":1,"participant":"Bob","content":"hi"}"#) {
            Err(EventDecodeError::InvalidPayload { event_type, .. }) => {
                assert_eq!(event_type, MESSAGE_EVENT_TYPE);
            }
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_non_json_and_missing_discriminant() {
        assert!(matches!(
            decode_event("not json"),
            Err(EventDecodeError::InvalidEnvelope(_))
        ));
        assert!(matches!(
            decode_event(r#"{"timestamp_millis":1,"participant":"Bob"}"#),
            Err(EventDecodeError::InvalidEnvelope(_))
        ));
    }
}
