use core::result::Result as CoreResult;
use std::io::Error as IoError;
use std::path::PathBuf;

use facepalm_core::Error as CoreError;
use serde_json::Error as JsonError;
use thiserror::Error;

/// Result type alias using the session [`Error`].
pub type Result<T> = CoreResult<T, Error>;

/// Errors raised while persisting or restoring a session.
#[derive(Debug, Error)]
pub enum Error {
    /// Error from facepalm-core
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// A storage file could not be read or written
    #[error("Storage error at {path:?}: {source}")]
    Storage {
        /// File being accessed
        path: PathBuf,
        /// Underlying I/O failure
        source: IoError,
    },

    /// The session blob is not valid JSON of the expected shape
    #[error("Corrupt session blob: {0}")]
    Json(#[from] JsonError),

    /// A storage key cannot be mapped to a file name
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}
