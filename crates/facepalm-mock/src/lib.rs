//! Request interception for the facepalm demo backend.
//!
//! A [`MockBackend`] decides whether an outgoing request is handled locally,
//! delays it by a fixed latency and fabricates a JSON response from an
//! in-memory [`facepalm_core::FixtureStore`]. An [`AvailabilityChannel`]
//! answers username-availability queries over a simulated message channel.

/// Response simulator and request pipeline.
pub mod backend;
/// Username availability channel.
pub mod channel;
/// Error taxonomy.
pub mod error;
/// Method and path based route selection.
pub mod router;

pub use backend::{Interception, MockBackend, MockRequest, MockResponse, PendingResponse};
pub use channel::{AvailabilityChannel, AvailabilityQuery, AvailabilityResponse, UsernameRegistry};
pub use error::{Error, MockError, Result};
pub use router::{Method, Route, RouteMatcher};
