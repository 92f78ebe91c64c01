//! Council Event Store — session logs on the local file system.
//!
//! One directory per session under a fixed root, one line-delimited JSON
//! log per directory, guarded by a whole-file advisory lock so that
//! cooperating processes on the same host serialize their mutations.

pub mod file_event_repository;
pub mod lock;
pub mod paths;

pub use file_event_repository::FileEventRepository;
pub use lock::LogLock;
pub use paths::SessionPaths;
