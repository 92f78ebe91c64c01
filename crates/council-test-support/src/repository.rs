//! Test repositories — in-memory `EventRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use council_core::error::DomainError;
use council_core::repository::{EventRepository, LockedStream};

type Streams = HashMap<String, Vec<String>>;

/// An event repository that keeps every stream in memory and records each
/// appended line.
///
/// A locked stream holds the repository-wide mutex, so concurrent mutations
/// serialize the same way they do against the file-backed store.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: Mutex<Streams>,
    appended: Mutex<Vec<(String, String)>>,
}

impl InMemoryEventRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a stream with raw lines. Seeded lines are not recorded as
    /// appended.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_lines(self, session_id: &str, lines: Vec<String>) -> Self {
        self.streams
            .lock()
            .unwrap()
            .insert(session_id.to_owned(), lines);
        self
    }

    /// Appends a raw line outside the locking protocol, as a corrupted or
    /// foreign writer would.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_raw_line(&self, session_id: &str, line: &str) {
        self.streams
            .lock()
            .unwrap()
            .entry(session_id.to_owned())
            .or_default()
            .push(line.to_owned());
    }

    /// Returns a snapshot of a stream's lines; empty if it does not exist.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn lines(&self, session_id: &str) -> Vec<String> {
        self.streams
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns a snapshot of every `(session_id, line)` appended through a
    /// locked stream.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_lines(&self) -> Vec<(String, String)> {
        self.appended.lock().unwrap().clone()
    }
}

struct InMemoryStream<'a> {
    session_id: String,
    streams: MutexGuard<'a, Streams>,
    appended: &'a Mutex<Vec<(String, String)>>,
}

impl LockedStream for InMemoryStream<'_> {
    fn read_lines(&mut self) -> Result<Vec<String>, DomainError> {
        Ok(self
            .streams
            .get(&self.session_id)
            .cloned()
            .unwrap_or_default())
    }

    fn append_line(&mut self, line: &str) -> Result<(), DomainError> {
        self.streams
            .entry(self.session_id.clone())
            .or_default()
            .push(line.to_owned());
        self.appended
            .lock()
            .unwrap()
            .push((self.session_id.clone(), line.to_owned()));
        Ok(())
    }
}

impl EventRepository for InMemoryEventRepository {
    fn stream_exists(&self, session_id: &str) -> Result<bool, DomainError> {
        Ok(self.streams.lock().unwrap().contains_key(session_id))
    }

    fn load_lines(&self, session_id: &str) -> Result<Vec<String>, DomainError> {
        self.streams
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| DomainError::SessionNotFound(session_id.to_owned()))
    }

    fn create_stream(&self, session_id: &str) -> Result<Box<dyn LockedStream + '_>, DomainError> {
        let mut streams = self.streams.lock().unwrap();
        streams.entry(session_id.to_owned()).or_default();
        Ok(Box::new(InMemoryStream {
            session_id: session_id.to_owned(),
            streams,
            appended: &self.appended,
        }))
    }

    fn lock_stream(&self, session_id: &str) -> Result<Box<dyn LockedStream + '_>, DomainError> {
        let streams = self.streams.lock().unwrap();
        if !streams.contains_key(session_id) {
            return Err(DomainError::SessionNotFound(session_id.to_owned()));
        }
        Ok(Box::new(InMemoryStream {
            session_id: session_id.to_owned(),
            streams,
            appended: &self.appended,
        }))
    }
}

/// An event repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

impl EventRepository for FailingEventRepository {
    fn stream_exists(&self, _session_id: &str) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }

    fn load_lines(&self, _session_id: &str) -> Result<Vec<String>, DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }

    fn create_stream(&self, _session_id: &str) -> Result<Box<dyn LockedStream + '_>, DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }

    fn lock_stream(&self, _session_id: &str) -> Result<Box<dyn LockedStream + '_>, DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }
}
