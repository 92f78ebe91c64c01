//! Integration tests for `FileEventRepository`.

use std::sync::Arc;
use std::thread;

use council_core::error::DomainError;
use council_core::repository::EventRepository;
use council_event_store::{FileEventRepository, SessionPaths};
use tempfile::TempDir;

fn repository(dir: &TempDir) -> FileEventRepository {
    FileEventRepository::new(SessionPaths::new(dir.path()))
}

// --- load_lines ---

#[test]
fn test_load_lines_returns_not_found_for_missing_session() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    match repo.load_lines("nope") {
        Err(DomainError::SessionNotFound(id)) => assert_eq!(id, "nope"),
        other => panic!("expected SessionNotFound, got {other:?}"),
    }
}

#[test]
fn test_lock_stream_returns_not_found_without_creating_file() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    assert!(matches!(
        repo.lock_stream("nope"),
        Err(DomainError::SessionNotFound(_))
    ));
    assert!(!repo.stream_exists("nope").unwrap());
}

// --- create_stream + append + load round-trip ---

#[test]
fn test_create_append_and_load_preserves_order() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    {
        let mut stream = repo.create_stream("s1").unwrap();
        assert!(stream.read_lines().unwrap().is_empty());
        stream.append_line(r#"{"n":1}"#).unwrap();
        stream.append_line(r#"{"n":2}"#).unwrap();
    }
    {
        let mut stream = repo.lock_stream("s1").unwrap();
        assert_eq!(stream.read_lines().unwrap().len(), 2);
        stream.append_line(r#"{"n":3}"#).unwrap();
    }

    let lines = repo.load_lines("s1").unwrap();
    assert_eq!(lines, vec![r#"{"n":1}"#, r#"{"n":2}"#, r#"{"n":3}"#]);

    let raw = std::fs::read_to_string(repo.paths().events_path("s1").unwrap()).unwrap();
    assert!(raw.ends_with('\n'));
}

#[test]
fn test_sessions_are_isolated() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    repo.create_stream("a").unwrap().append_line("a1").unwrap();
    repo.create_stream("b").unwrap().append_line("b1").unwrap();

    assert_eq!(repo.load_lines("a").unwrap(), vec!["a1"]);
    assert_eq!(repo.load_lines("b").unwrap(), vec!["b1"]);
}

#[test]
fn test_invalid_session_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);

    assert!(matches!(
        repo.create_stream("../escape"),
        Err(DomainError::Validation(_))
    ));
}

#[test]
fn test_invalid_utf8_line_is_reported_with_its_line_number() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    drop(repo.create_stream("bytes").unwrap());
    let mut contents = br#"{"type":"session_created","timestamp_millis":1,"id":"bytes"}"#.to_vec();
    contents.extend_from_slice(b"\n\xff\xfe\n");
    std::fs::write(repo.paths().events_path("bytes").unwrap(), contents).unwrap();

    // Act
    let loaded = repo.load_lines("bytes");
    let locked = repo.lock_stream("bytes").unwrap().read_lines();

    // Assert
    for result in [loaded, locked] {
        match result {
            Err(DomainError::MalformedEvent {
                session_id, line, ..
            }) => {
                assert_eq!(session_id, "bytes");
                assert_eq!(line, 2);
            }
            other => panic!("expected MalformedEvent, got {other:?}"),
        }
    }
}

#[test]
fn test_crlf_line_endings_are_stripped() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    drop(repo.create_stream("crlf").unwrap());
    std::fs::write(repo.paths().events_path("crlf").unwrap(), "a\r\nb\r\n").unwrap();

    assert_eq!(repo.load_lines("crlf").unwrap(), vec!["a", "b"]);
}

// --- concurrency ---

#[test]
fn test_concurrent_read_modify_append_never_loses_writes() {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(repository(&dir));
    repo.create_stream("race").unwrap().append_line("0").unwrap();

    let writers: Vec<_> = (0..8)
        .map(|_| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                for _ in 0..10 {
                    let mut stream = repo.lock_stream("race").unwrap();
                    let count = stream.read_lines().unwrap().len();
                    stream.append_line(&count.to_string()).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    // Every writer saw the previous writer's line, so each line holds its
    // own zero-based index.
    let lines = repo.load_lines("race").unwrap();
    assert_eq!(lines.len(), 81);
    for (index, line) in lines.iter().enumerate() {
        assert_eq!(line, &index.to_string());
    }
}
