//! Simulated bidirectional channel answering username-availability queries.
//!
//! The application writes JSON text frames to the channel and reads replies
//! from it, as it would over a websocket. Only
//! `username_available_query` frames are answered; everything else is
//! dropped with a log line.

use std::collections::HashSet;

use facepalm_core::{ChannelConfig, SimulatedLatency};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Frame type of an availability query.
pub const QUERY_TYPE: &str = "username_available_query";

/// Frame type of an availability reply.
pub const RESPONSE_TYPE: &str = "username_available_response";

/// Outbound query frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    /// Always [`QUERY_TYPE`]
    #[serde(rename = "type")]
    pub kind: String,
    /// Username to check
    pub username: String,
}

impl AvailabilityQuery {
    /// Creates a query for `username`.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            kind: QUERY_TYPE.to_owned(),
            username: username.into(),
        }
    }
}

/// Inbound reply frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// Always [`RESPONSE_TYPE`]
    #[serde(rename = "type")]
    pub kind: String,
    /// Username that was checked
    pub username: String,
    /// Whether the username can still be registered
    pub available: bool,
}

/// Static list of usernames that are already taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsernameRegistry {
    reserved: HashSet<String>,
}

impl UsernameRegistry {
    /// Creates a registry reserving `names`.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `username` is free. Blank usernames never are.
    #[must_use]
    pub fn is_available(&self, username: &str) -> bool {
        !username.trim().is_empty() && !self.reserved.contains(username)
    }

    /// Answers a query.
    #[must_use]
    pub fn answer(&self, query: &AvailabilityQuery) -> AvailabilityResponse {
        AvailabilityResponse {
            kind: RESPONSE_TYPE.to_owned(),
            username: query.username.clone(),
            available: self.is_available(&query.username),
        }
    }

    /// Decodes a text frame, returning the query it carries if it is one.
    #[must_use]
    pub fn parse_frame(frame: &str) -> Option<AvailabilityQuery> {
        let value: JsonValue = match serde_json::from_str(frame) {
            Ok(value) => value,
            Err(error) => {
                warn!("Ignoring undecodable channel frame: {error}");
                return None;
            }
        };

        let kind = value
            .get("type")
            .and_then(JsonValue::as_str)
            .map(str::to_owned);

        match kind.as_deref() {
            Some(QUERY_TYPE) => match serde_json::from_value(value) {
                Ok(query) => Some(query),
                Err(error) => {
                    warn!("Ignoring malformed availability query: {error}");
                    None
                }
            },
            other => {
                debug!("Ignoring channel frame of type {other:?}");
                None
            }
        }
    }
}

/// A text frame stamped with the time its reply is due.
#[derive(Debug)]
struct Frame {
    deadline: Instant,
    text: String,
}

/// The application's end of the availability channel.
#[derive(Debug)]
pub struct AvailabilityChannel {
    latency: SimulatedLatency,
    outgoing: mpsc::UnboundedSender<Frame>,
    incoming: mpsc::UnboundedReceiver<String>,
}

impl AvailabilityChannel {
    /// Spawns the answering side on the current tokio runtime.
    #[must_use]
    pub fn spawn(registry: UsernameRegistry, latency: SimulatedLatency) -> Self {
        let (outgoing, frames) = mpsc::unbounded_channel();
        let (replies, incoming) = mpsc::unbounded_channel();
        tokio::spawn(run_responder(registry, frames, replies));
        debug!("Availability channel started with {:?} latency", latency.delay());
        Self {
            latency,
            outgoing,
            incoming,
        }
    }

    /// Spawns a channel configured from `config`.
    #[must_use]
    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::spawn(
            UsernameRegistry::new(config.reserved_usernames.iter().cloned()),
            config.latency(),
        )
    }

    /// Sends a raw text frame.
    ///
    /// # Errors
    /// Returns an error if the responder has shut down
    pub fn send(&self, text: impl Into<String>) -> Result<()> {
        let frame = Frame {
            deadline: self.latency.deadline(),
            text: text.into(),
        };
        self.outgoing
            .send(frame)
            .map_err(|_| Error::WorkerClosed("Availability"))
    }

    /// Sends an availability query for `username`.
    ///
    /// # Errors
    /// Returns an error if the query cannot be encoded or the responder has shut down
    pub fn query(&self, username: &str) -> Result<()> {
        self.send(serde_json::to_string(&AvailabilityQuery::new(username))?)
    }

    /// Receives the next raw reply frame, or `None` once the responder is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.incoming.recv().await
    }

    /// Receives and decodes the next reply.
    ///
    /// # Errors
    /// Returns an error if the responder has shut down or the reply does not decode
    pub async fn recv_response(&mut self) -> Result<AvailabilityResponse> {
        let text = self
            .recv()
            .await
            .ok_or(Error::WorkerClosed("Availability"))?;
        Ok(serde_json::from_str(&text)?)
    }
}

async fn run_responder(
    registry: UsernameRegistry,
    mut frames: mpsc::UnboundedReceiver<Frame>,
    replies: mpsc::UnboundedSender<String>,
) {
    while let Some(frame) = frames.recv().await {
        let Some(query) = UsernameRegistry::parse_frame(&frame.text) else {
            continue;
        };

        SimulatedLatency::wait_until(frame.deadline).await;
        let response = registry.answer(&query);
        debug!(
            "Username {} available={}",
            response.username, response.available
        );

        let encoded = match serde_json::to_string(&response) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!("Failed to encode availability reply: {error}");
                continue;
            }
        };
        if replies.send(encoded).is_err() {
            debug!("Availability channel closed by the application");
            break;
        }
    }
}
