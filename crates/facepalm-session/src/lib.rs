//! Session persistence for the facepalm demo app.
//!
//! The [`SessionBridge`] writes the logged-in session to durable or
//! ephemeral key-value storage depending on the remember-me flag, and reads
//! it back ephemeral-first on startup.

/// Save, clear and restore of the session blob.
pub mod bridge;
/// Storage error types.
pub mod error;
/// Key-value storage backends.
pub mod storage;

pub use bridge::SessionBridge;
pub use error::{Error, Result};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
