//! Core types for the facepalm mock backend.
//!
//! This crate provides the data model, the request and response schemas
//! exchanged with the interceptor, the in-memory fixture store, simulated
//! latency and configuration shared by the other facepalm crates.

/// Configuration loading and defaults.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Simulated network latency.
pub mod latency;
/// In-memory fixture collections.
pub mod store;
/// Data model and wire schemas.
pub mod types;

pub use config::{ChannelConfig, FacepalmConfig, MockConfig, SessionConfig};
pub use error::{Error, Result};
pub use latency::SimulatedLatency;
pub use store::{FixtureStore, IdSequence};
pub use types::{
    Comment, CommentResponse, ErrorBody, LoginRequest, LoginResponse, NewComment, NewPost, Post,
    PostResponse, PostsResponse, RegisterRequest, RegisterResponse, Session, User, UserProfile,
};
