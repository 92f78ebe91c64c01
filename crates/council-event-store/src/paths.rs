//! Session path resolution.
//!
//! Layout: `<root>/sessions/<session-id>/events.jsonl`, where `<root>`
//! defaults to `~/.council` and can be overridden with `COUNCIL_HOME`.

use std::fs;
use std::path::{Path, PathBuf};

use council_core::error::DomainError;

/// Name of the hidden directory created under the user's home.
pub const COUNCIL_DIR: &str = ".council";

/// Subdirectory of the root holding one directory per session.
pub const SESSIONS_DIR: &str = "sessions";

/// File name of a session's event log.
pub const EVENTS_FILE: &str = "events.jsonl";

/// Environment variable overriding the store root.
pub const COUNCIL_HOME_ENV: &str = "COUNCIL_HOME";

/// Maps session identifiers to their on-disk log locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    root: PathBuf,
}

impl SessionPaths {
    /// Creates a resolver rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the root from a configuration lookup: `COUNCIL_HOME` if set
    /// and non-empty, `~/.council` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if no override is given and the
    /// home directory cannot be determined.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(COUNCIL_HOME_ENV).filter(|value| !value.is_empty()) {
            return Ok(Self::new(root));
        }
        let home = dirs::home_dir().ok_or_else(|| {
            DomainError::Infrastructure("could not determine home directory".to_owned())
        })?;
        Ok(Self::new(home.join(COUNCIL_DIR)))
    }

    /// Resolves the root from the process environment.
    ///
    /// # Errors
    ///
    /// See [`SessionPaths::from_lookup`].
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The store root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every session directory.
    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join(SESSIONS_DIR)
    }

    /// Directory of one session.
    ///
    /// The identifier is used verbatim as a single path segment, so it must
    /// be non-empty, free of path separators and not `.` or `..`; otherwise
    /// two identifiers could resolve to the same file.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unusable identifier.
    pub fn session_dir(&self, session_id: &str) -> Result<PathBuf, DomainError> {
        validate_session_id(session_id)?;
        Ok(self.sessions_dir().join(session_id))
    }

    /// Path of a session's event log.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unusable identifier.
    pub fn events_path(&self, session_id: &str) -> Result<PathBuf, DomainError> {
        Ok(self.session_dir(session_id)?.join(EVENTS_FILE))
    }

    /// Creates every missing directory up to and including the session
    /// directory. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unusable identifier and
    /// `DomainError::Infrastructure` if a directory cannot be created.
    pub fn ensure_container_exists(&self, session_id: &str) -> Result<(), DomainError> {
        let dir = self.session_dir(session_id)?;
        fs::create_dir_all(&dir).map_err(|e| {
            DomainError::Infrastructure(format!("failed to create {}: {e}", dir.display()))
        })
    }

    /// Reports whether the session's log file is present, without opening it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unusable identifier and
    /// `DomainError::Infrastructure` if the file system cannot be queried.
    pub fn exists(&self, session_id: &str) -> Result<bool, DomainError> {
        let path = self.events_path(session_id)?;
        path.try_exists().map_err(|e| {
            DomainError::Infrastructure(format!("failed to stat {}: {e}", path.display()))
        })
    }
}

fn validate_session_id(session_id: &str) -> Result<(), DomainError> {
    if session_id.is_empty() {
        return Err(DomainError::Validation("session id must not be empty".to_owned()));
    }
    if session_id == "." || session_id == ".." {
        return Err(DomainError::Validation(format!(
            "session id '{session_id}' is not a valid path segment"
        )));
    }
    if session_id.contains(['/', '\\', '\0']) {
        return Err(DomainError::Validation(format!(
            "session id '{session_id}' must not contain path separators"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_events_path_layout() {
        let paths = SessionPaths::new("/srv/council");
        assert_eq!(
            paths.events_path("gently-amber-heron").unwrap(),
            PathBuf::from("/srv/council/sessions/gently-amber-heron/events.jsonl")
        );
    }

    #[test]
    fn test_distinct_ids_resolve_to_distinct_paths() {
        let paths = SessionPaths::new("/srv/council");
        let a = paths.events_path("alpha").unwrap();
        let b = paths.events_path("alpha-2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_path_hostile_ids_are_rejected() {
        let paths = SessionPaths::new("/srv/council");
        for id in ["", ".", "..", "a/b", "a\\b", "../escape"] {
            match paths.events_path(id) {
                Err(DomainError::Validation(_)) => {}
                other => panic!("expected Validation for {id:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_ensure_container_exists_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let paths = SessionPaths::new(dir.path());

        paths.ensure_container_exists("s1").unwrap();
        paths.ensure_container_exists("s1").unwrap();

        assert!(paths.session_dir("s1").unwrap().is_dir());
        assert!(!paths.exists("s1").unwrap());
    }

    #[test]
    fn test_exists_reports_log_presence() {
        let dir = TempDir::new().unwrap();
        let paths = SessionPaths::new(dir.path());
        paths.ensure_container_exists("s1").unwrap();

        fs::write(paths.events_path("s1").unwrap(), b"").unwrap();

        assert!(paths.exists("s1").unwrap());
        assert!(!paths.exists("s2").unwrap());
    }

    #[test]
    fn test_from_lookup_prefers_override() {
        let paths = SessionPaths::from_lookup(|key| {
            (key == COUNCIL_HOME_ENV).then(|| "/tmp/council-home".to_owned())
        })
        .unwrap();
        assert_eq!(paths.root(), Path::new("/tmp/council-home"));
    }

    #[test]
    fn test_from_lookup_ignores_empty_override() {
        let Ok(paths) = SessionPaths::from_lookup(|_| Some(String::new())) else {
            // No home directory in this environment; nothing to compare.
            return;
        };
        assert!(paths.root().ends_with(COUNCIL_DIR));
    }
}
