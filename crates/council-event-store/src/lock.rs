//! Exclusive whole-file advisory lock.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

/// An open file holding an exclusive advisory lock.
///
/// The lock is bound to this handle's file descriptor and is released when
/// the handle is dropped. It is cross-process but advisory: only writers
/// that also take the lock are excluded. It is not reentrant; acquiring a
/// second `LogLock` on the same path before dropping the first blocks
/// forever.
#[derive(Debug)]
pub struct LogLock {
    file: File,
    path: PathBuf,
}

impl LogLock {
    /// Opens `path` for reading and writing, creating it if absent, and
    /// blocks until the exclusive lock is obtained. There is no timeout.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened or locked.
    pub fn acquire(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        FileExt::lock_exclusive(&file)?;
        debug!(path = %path.display(), "acquired log lock");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// The locked file.
    #[must_use]
    pub fn file(&self) -> &File {
        &self.file
    }

    /// The path the lock was taken on.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LogLock {
    fn drop(&mut self) {
        // Closing the descriptor releases the lock as well; unlocking first
        // makes the release independent of when the handle is closed.
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to release log lock");
        } else {
            debug!(path = %self.path.display(), "released log lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");

        let lock = LogLock::acquire(&path).unwrap();

        assert!(path.exists());
        assert_eq!(lock.path(), path.as_path());
    }

    #[test]
    fn test_second_handle_cannot_lock_while_held() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let lock = LogLock::acquire(&path).unwrap();

        let other = OpenOptions::new().read(true).write(true).open(&path).unwrap();
        assert!(FileExt::try_lock_exclusive(&other).is_err());

        drop(lock);
        assert!(FileExt::try_lock_exclusive(&other).is_ok());
        FileExt::unlock(&other).unwrap();
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let lock = LogLock::acquire(&path).unwrap();

        let (tx, rx) = mpsc::channel();
        let waiter_path = path.clone();
        let waiter = thread::spawn(move || {
            let _held = LogLock::acquire(&waiter_path).unwrap();
            tx.send(()).unwrap();
        });

        // Still blocked while the first handle is alive.
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        drop(lock);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        waiter.join().unwrap();
    }
}
