//! Configuration for the mock backend, availability channel and session bridge.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::latency::SimulatedLatency;

/// Storage key used by the demo application for its session blob.
pub const DEFAULT_STORAGE_KEY: &str = "elm-burrito-update-demo-app-session";

/// Usernames the availability channel reports as taken.
pub const DEFAULT_RESERVED_USERNAMES: [&str; 6] =
    ["bob", "laserpants", "neo", "neonpants", "admin", "speedo"];

/// Complete facepalm configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacepalmConfig {
    /// Request interceptor settings
    pub mock: MockConfig,
    /// Availability channel settings
    pub channel: ChannelConfig,
    /// Session bridge settings
    pub session: SessionConfig,
}

/// Request interceptor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Delay applied to every intercepted request, in milliseconds
    pub request_delay_ms: u64,
    /// Whether the store starts with the demo fixtures
    pub seed_fixtures: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 400,
            seed_fixtures: true,
        }
    }
}

impl MockConfig {
    /// Request latency as a [`SimulatedLatency`].
    #[must_use]
    pub const fn latency(&self) -> SimulatedLatency {
        SimulatedLatency::from_millis(self.request_delay_ms)
    }
}

/// Availability channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Delay before each reply, in milliseconds
    pub reply_delay_ms: u64,
    /// Usernames reported as unavailable
    pub reserved_usernames: Vec<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 300,
            reserved_usernames: DEFAULT_RESERVED_USERNAMES
                .iter()
                .map(|name| (*name).to_owned())
                .collect(),
        }
    }
}

impl ChannelConfig {
    /// Reply latency as a [`SimulatedLatency`].
    #[must_use]
    pub const fn latency(&self) -> SimulatedLatency {
        SimulatedLatency::from_millis(self.reply_delay_ms)
    }
}

/// Session bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Key under which the session blob is stored
    pub storage_key: String,
    /// Directory backing durable storage (defaults to `~/.facepalm/storage`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durable_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            durable_dir: None,
        }
    }
}

impl SessionConfig {
    /// Resolves the durable storage directory.
    ///
    /// # Errors
    /// Returns an error if no directory is configured and the home directory
    /// cannot be determined
    pub fn resolve_durable_dir(&self) -> Result<PathBuf> {
        match &self.durable_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(FacepalmConfig::config_dir()?.join("storage")),
        }
    }
}

impl FacepalmConfig {
    /// Get the default config directory path (`~/.facepalm`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".facepalm"))
    }

    /// Get the default config file path (`~/.facepalm/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location, creating it with defaults if missing
    ///
    /// # Errors
    /// Returns an error if the config cannot be read or created
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path()?)
    }

    /// Load config from `path`, creating it with defaults if missing
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed or written
    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            let config = Self::default();
            config.save_to_file(path)?;
            Ok(config)
        }
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        debug!(
            "Loaded config from {:?}: request_delay_ms={}, reserved_usernames={}",
            path,
            config.mock.request_delay_ms,
            config.channel.reserved_usernames.len()
        );

        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;

        let header = "# Facepalm Configuration File\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }

    /// Checks values that deserialize fine but cannot work.
    ///
    /// # Errors
    /// Returns an error if the storage key is empty
    pub fn validate(&self) -> Result<()> {
        if self.session.storage_key.trim().is_empty() {
            return Err(Error::Config("session.storage_key must not be empty".to_owned()));
        }
        Ok(())
    }
}
