//! Human-readable session transcript.

use council_session::domain::aggregates::Session;
use council_session::domain::events::SessionEventKind;
use council_session::domain::reserved::MODERATOR;

/// Renders the header, the active roster and every event numbered above
/// `after`.
///
/// `session_created` is never shown, nor is the moderator joining.
pub fn format_status(session: &Session, after: usize) -> String {
    let mut out = format!("=== Session: {} ===\n", session.id);

    let participants = session.active_participants();
    if participants.is_empty() {
        out.push_str("Participants: (none)\n");
    } else {
        out.push_str(&format!("Participants: {}\n", participants.join(", ")));
    }
    out.push('\n');

    for (index, event) in session.events().iter().enumerate() {
        let number = index + 1;
        if number <= after {
            continue;
        }
        match &event.kind {
            SessionEventKind::SessionCreated(_) => {}
            SessionEventKind::Joined(joined) => {
                if joined.participant != MODERATOR {
                    out.push_str(&format!("--- #{number} | {} Joined ---\n\n", joined.participant));
                }
            }
            SessionEventKind::Left(left) => {
                out.push_str(&format!("--- #{number} | {} Left ---\n\n", left.participant));
            }
            SessionEventKind::Message(message) => {
                out.push_str(&format!("--- #{number} | {} ---\n", message.participant));
                out.push_str(&message.content);
                if !message.content.ends_with('\n') {
                    out.push('\n');
                }
                if message.next.is_empty() {
                    out.push_str(&format!("--- End #{number} | {} ---\n\n", message.participant));
                } else {
                    out.push_str(&format!(
                        "--- End #{number} | {} | Next: {} ---\n\n",
                        message.participant, message.next
                    ));
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use council_session::application::command_handlers::reconstitute;

    use super::*;

    fn session(lines: &[&str]) -> Session {
        reconstitute("lazily-brave-koala", lines).unwrap()
    }

    const CREATED: &str = r#"{"type":"session_created","timestamp_millis":1,"id":"lazily-brave-koala"}"#;

    #[test]
    fn test_empty_session_shows_no_participants() {
        let output = format_status(&session(&[CREATED]), 0);

        assert_eq!(
            output,
            "=== Session: lazily-brave-koala ===\nParticipants: (none)\n\n"
        );
    }

    #[test]
    fn test_full_transcript() {
        // Arrange
        let session = session(&[
            CREATED,
            r#"{"type":"joined","timestamp_millis":2,"participant":"Bob"}"#,
            r#"{"type":"joined","timestamp_millis":3,"participant":"Alice"}"#,
            r#"{"type":"message","timestamp_millis":4,"participant":"Alice","content":"Plan A?","next":"Bob"}"#,
            r#"{"type":"message","timestamp_millis":5,"participant":"Bob","content":"Agreed.\n","next":"Alice"}"#,
            r#"{"type":"left","timestamp_millis":6,"participant":"Bob"}"#,
        ]);

        // Act
        let output = format_status(&session, 0);

        // Assert
        let expected = "\
=== Session: lazily-brave-koala ===
Participants: Alice

--- #2 | Bob Joined ---

--- #3 | Alice Joined ---

--- #4 | Alice ---
Plan A?
--- End #4 | Alice | Next: Bob ---

--- #5 | Bob ---
Agreed.
--- End #5 | Bob | Next: Alice ---

--- #6 | Bob Left ---

";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_watermark_and_moderator_join_are_hidden() {
        let session = session(&[
            CREATED,
            r#"{"type":"joined","timestamp_millis":2,"participant":"Moderator"}"#,
            r#"{"type":"joined","timestamp_millis":3,"participant":"Alice"}"#,
            r#"{"type":"message","timestamp_millis":4,"participant":"Moderator","content":"Go","next":"Alice"}"#,
        ]);

        let output = format_status(&session, 3);

        assert!(!output.contains("Joined"));
        assert!(output.contains("--- #4 | Moderator ---\nGo\n--- End #4 | Moderator | Next: Alice ---"));
        assert!(output.contains("Participants: Alice\n"));
    }
}
