//! File-system implementation of the `EventRepository` trait.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use council_core::error::DomainError;
use council_core::repository::{EventRepository, LockedStream};
use tracing::debug;

use crate::lock::LogLock;
use crate::paths::SessionPaths;

/// Event repository storing one line-delimited log file per session.
#[derive(Debug, Clone)]
pub struct FileEventRepository {
    paths: SessionPaths,
}

impl FileEventRepository {
    /// Creates a new `FileEventRepository`.
    #[must_use]
    pub fn new(paths: SessionPaths) -> Self {
        Self { paths }
    }

    /// The path resolver backing this repository.
    #[must_use]
    pub fn paths(&self) -> &SessionPaths {
        &self.paths
    }

    fn lock(&self, session_id: &str) -> Result<LockedLogFile, DomainError> {
        let path = self.paths.events_path(session_id)?;
        let lock = LogLock::acquire(&path).map_err(|e| io_error("lock", &path, &e))?;
        Ok(LockedLogFile {
            session_id: session_id.to_owned(),
            lock,
        })
    }
}

impl EventRepository for FileEventRepository {
    fn stream_exists(&self, session_id: &str) -> Result<bool, DomainError> {
        self.paths.exists(session_id)
    }

    fn load_lines(&self, session_id: &str) -> Result<Vec<String>, DomainError> {
        let path = self.paths.events_path(session_id)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DomainError::SessionNotFound(session_id.to_owned()));
            }
            Err(e) => return Err(io_error("open", &path, &e)),
        };
        let lines = read_all_lines(&file, session_id, &path)?;
        debug!(session_id, lines = lines.len(), "loaded session log");
        Ok(lines)
    }

    fn create_stream(&self, session_id: &str) -> Result<Box<dyn LockedStream + '_>, DomainError> {
        self.paths.ensure_container_exists(session_id)?;
        Ok(Box::new(self.lock(session_id)?))
    }

    fn lock_stream(&self, session_id: &str) -> Result<Box<dyn LockedStream + '_>, DomainError> {
        if !self.paths.exists(session_id)? {
            return Err(DomainError::SessionNotFound(session_id.to_owned()));
        }
        Ok(Box::new(self.lock(session_id)?))
    }
}

/// A session log held under its exclusive lock.
#[derive(Debug)]
struct LockedLogFile {
    session_id: String,
    lock: LogLock,
}

impl LockedStream for LockedLogFile {
    fn read_lines(&mut self) -> Result<Vec<String>, DomainError> {
        let mut file = self.lock.file();
        file.seek(SeekFrom::Start(0))
            .map_err(|e| io_error("seek", self.lock.path(), &e))?;
        read_all_lines(file, &self.session_id, self.lock.path())
    }

    fn append_line(&mut self, line: &str) -> Result<(), DomainError> {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');

        let mut file = self.lock.file();
        file.seek(SeekFrom::End(0))
            .map_err(|e| io_error("seek", self.lock.path(), &e))?;
        file.write_all(record.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| io_error("append to", self.lock.path(), &e))
    }
}

/// Splits a log into its lines. A line that is not valid UTF-8 is reported
/// as malformed under its 1-indexed number rather than failing the read.
fn read_all_lines(
    mut reader: impl Read,
    session_id: &str,
    path: &Path,
) -> Result<Vec<String>, DomainError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| io_error("read", path, &e))?;

    let mut raw_lines: Vec<&[u8]> = bytes.split(|byte| *byte == b'\n').collect();
    if raw_lines.last().is_some_and(|last| last.is_empty()) {
        raw_lines.pop();
    }

    raw_lines
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            String::from_utf8(raw.to_vec()).map_err(|e| DomainError::MalformedEvent {
                session_id: session_id.to_owned(),
                line: index + 1,
                reason: format!("invalid UTF-8: {e}"),
            })
        })
        .collect()
}

fn io_error(action: &str, path: &Path, err: &io::Error) -> DomainError {
    DomainError::Infrastructure(format!("failed to {action} {}: {err}", path.display()))
}
