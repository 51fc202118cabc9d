//! Error types for the interceptor.
//!
//! [`MockError`] is the request-level taxonomy reported inside simulated
//! responses; [`Error`] covers failures of the interceptor itself.

use core::result::Result as CoreResult;

use facepalm_core::{Error as CoreError, ErrorBody};
use regex::Error as RegexError;
use serde_json::Error as JsonError;
use thiserror::Error;

/// Result type alias using the interceptor [`Error`].
pub type Result<T> = CoreResult<T, Error>;

/// Failures reported to the caller as a status code and JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    /// Login with no matching username and password pair
    #[error("Unauthorized")]
    Unauthorized,

    /// Lookup of a post that does not exist
    #[error("Not Found")]
    NotFound,

    /// Request body does not match the route's schema
    #[error("Bad Request: {0}")]
    Malformed(String),

    /// Registration of a username that is already taken
    #[error("Conflict: username {0} is taken")]
    Conflict(String),
}

impl MockError {
    /// HTTP status code for this failure.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Malformed(_) => 400,
            Self::Conflict(_) => 409,
        }
    }

    /// Reason phrase placed in the `error` field of the response body.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "Not Found",
            Self::Malformed(_) => "Bad Request",
            Self::Conflict(_) => "Conflict",
        }
    }

    /// JSON error body for this failure.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.reason().to_owned(),
        }
    }
}

impl From<JsonError> for MockError {
    fn from(error: JsonError) -> Self {
        Self::Malformed(error.to_string())
    }
}

/// Failures of the interceptor machinery.
#[derive(Debug, Error)]
pub enum Error {
    /// Error from facepalm-core
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// A route pattern failed to compile
    #[error("Invalid route pattern: {0}")]
    Pattern(#[from] RegexError),

    /// JSON serialization or deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] JsonError),

    /// The background worker is no longer running
    #[error("{0} worker has shut down")]
    WorkerClosed(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(MockError::Unauthorized.status(), 401);
        assert_eq!(MockError::NotFound.status(), 404);
        assert_eq!(MockError::Malformed("x".to_owned()).status(), 400);
        assert_eq!(MockError::Conflict("bob".to_owned()).status(), 409);
    }

    #[test]
    fn test_error_bodies() {
        assert_eq!(MockError::Unauthorized.body().error, "Unauthorized");
        assert_eq!(MockError::NotFound.body().error, "Not Found");
        assert_eq!(MockError::Malformed("x".to_owned()).body().error, "Bad Request");
    }

    #[test]
    fn test_worker_closed_display() {
        let error = Error::WorkerClosed("Request");
        assert_eq!(error.to_string(), "Request worker has shut down");
    }
}
