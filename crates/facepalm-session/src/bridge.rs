//! Bridges application session events to key-value storage.

use facepalm_core::{Session, SessionConfig};
use tracing::{debug, info};

use crate::error::Result;
use crate::storage::KeyValueStore;

/// Persists the session blob under one fixed key.
///
/// Sessions marked remember-me go to `durable`, all others to `ephemeral`.
#[derive(Debug, Clone)]
pub struct SessionBridge<D, E> {
    key: String,
    durable: D,
    ephemeral: E,
}

impl<D, E> SessionBridge<D, E>
where
    D: KeyValueStore,
    E: KeyValueStore,
{
    /// Creates a bridge storing under `key`.
    pub fn new(key: impl Into<String>, durable: D, ephemeral: E) -> Self {
        Self {
            key: key.into(),
            durable,
            ephemeral,
        }
    }

    /// Creates a bridge using the configured storage key.
    pub fn from_config(config: &SessionConfig, durable: D, ephemeral: E) -> Self {
        Self::new(config.storage_key.clone(), durable, ephemeral)
    }

    /// The storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Handles a "session saved" event.
    ///
    /// # Errors
    /// Returns an error if the session cannot be encoded or written
    pub fn save(&mut self, session: &Session) -> Result<()> {
        let blob = serde_json::to_string(session)?;
        if session.remember_me() {
            self.durable.set(&self.key, &blob)?;
            info!("Saved session for {} to durable storage", session.user.username);
        } else {
            self.ephemeral.set(&self.key, &blob)?;
            info!("Saved session for {} to ephemeral storage", session.user.username);
        }
        Ok(())
    }

    /// Handles a "session cleared" event by removing the key from both stores.
    ///
    /// # Errors
    /// Returns an error if either store cannot be written
    pub fn clear(&mut self) -> Result<()> {
        self.durable.remove(&self.key)?;
        self.ephemeral.remove(&self.key)?;
        info!("Cleared session");
        Ok(())
    }

    /// Reads the raw blob, ephemeral store first. Empty values are skipped.
    ///
    /// # Errors
    /// Returns an error if a store cannot be read
    pub fn load_blob(&self) -> Result<Option<String>> {
        if let Some(blob) = self.ephemeral.get(&self.key)?.filter(|blob| !blob.is_empty()) {
            debug!("Restoring session from ephemeral storage");
            return Ok(Some(blob));
        }
        let durable = self.durable.get(&self.key)?.filter(|blob| !blob.is_empty());
        if durable.is_some() {
            debug!("Restoring session from durable storage");
        }
        Ok(durable)
    }

    /// Restores the session saved by a previous run, if any.
    ///
    /// # Errors
    /// Returns an error if a store cannot be read or the blob is corrupt
    pub fn restore(&self) -> Result<Option<Session>> {
        self.load_blob()?
            .map(|blob| serde_json::from_str(&blob).map_err(Into::into))
            .transpose()
    }

    /// The durable store.
    pub fn durable(&self) -> &D {
        &self.durable
    }

    /// The ephemeral store.
    pub fn ephemeral(&self) -> &E {
        &self.ephemeral
    }
}
