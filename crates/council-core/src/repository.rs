//! Event repository abstraction.
//!
//! A session stream is an append-only sequence of encoded event lines. The
//! repository hands out raw lines; decoding and replay belong to the
//! session context.

use crate::error::DomainError;

/// Exclusive, scoped access to one session stream.
///
/// Obtained from [`EventRepository::create_stream`] or
/// [`EventRepository::lock_stream`]. The exclusive lock is held for the
/// lifetime of the value and released when it is dropped, on every exit
/// path. Holders must not request a second lock on the same stream before
/// dropping the first: locks are not reentrant.
pub trait LockedStream {
    /// Reads every line currently in the stream, in append order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the stream cannot be read, or
    /// `DomainError::MalformedEvent` for a line that is not valid UTF-8.
    fn read_lines(&mut self) -> Result<Vec<String>, DomainError>;

    /// Appends one encoded event. The implementation adds the line
    /// terminator and writes the whole record in a single write.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the write fails.
    fn append_line(&mut self, line: &str) -> Result<(), DomainError>;
}

/// Repository trait for loading and appending session event lines.
pub trait EventRepository: Send + Sync {
    /// Reports whether a stream exists for the session, without opening it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unusable identifier and
    /// `DomainError::Infrastructure` if existence cannot be determined.
    fn stream_exists(&self, session_id: &str) -> Result<bool, DomainError>;

    /// Loads all lines of a stream without taking the lock.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if the stream does not exist, or
    /// `DomainError::MalformedEvent` for a line that is not valid UTF-8.
    fn load_lines(&self, session_id: &str) -> Result<Vec<String>, DomainError>;

    /// Brings the stream's container into existence, opens the stream
    /// (creating it if absent) and blocks until the exclusive lock is held.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the stream cannot be created
    /// or locked.
    fn create_stream(&self, session_id: &str) -> Result<Box<dyn LockedStream + '_>, DomainError>;

    /// Blocks until the exclusive lock on an existing stream is held.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if the stream does not exist.
    fn lock_stream(&self, session_id: &str) -> Result<Box<dyn LockedStream + '_>, DomainError>;
}
