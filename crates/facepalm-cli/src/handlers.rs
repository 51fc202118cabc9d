//! Command handlers for CLI operations

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use facepalm_core::{FacepalmConfig, LoginResponse};
use facepalm_mock::{AvailabilityChannel, Method, MockBackend, MockRequest};
use facepalm_session::{FileStore, MemoryStore, SessionBridge};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tokio::fs as async_fs;
use tokio::io::{AsyncReadExt as _, stdin as async_stdin};
use tracing::{debug, warn};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use crate::cli::{Cli, Command, SessionAction};

/// Bridge type used by the CLI: files for durable storage, memory for the rest of the run.
type CliBridge = SessionBridge<FileStore, MemoryStore>;

/// One line of a replay script.
#[derive(Debug, Deserialize)]
struct ReplayEntry {
    method: Method,
    url: String,
    #[serde(default)]
    body: Option<JsonValue>,
}

impl ReplayEntry {
    /// Converts the entry into a request; string bodies are sent verbatim.
    fn into_request(self) -> MockRequest {
        let body = self.body.map(|body| match body {
            JsonValue::String(raw) => raw,
            other => other.to_string(),
        });
        MockRequest {
            method: self.method,
            url: self.url,
            body,
        }
    }
}

/// Installs the stderr tracing subscriber
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "facepalm=debug,facepalm_core=debug,facepalm_mock=debug,facepalm_session=debug"
    } else {
        "facepalm=info,facepalm_core=info,facepalm_mock=info,facepalm_session=info"
    };

    Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .init();
}

/// Dispatches the parsed command
///
/// # Errors
/// Returns an error if the selected command fails
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli);

    match cli.command {
        Command::Replay { input } => handle_replay(&config, &input).await,
        Command::Username { names } => handle_username(&config, &names).await,
        Command::Session { action } => handle_session(&config, action),
    }
}

/// Loads configuration and applies command-line overrides
fn load_config(cli: &Cli) -> FacepalmConfig {
    let loaded = cli.config.as_deref().map_or_else(
        FacepalmConfig::load_or_create,
        FacepalmConfig::load_or_create_at,
    );

    let mut config = loaded.unwrap_or_else(|error| {
        warn!("Failed to load config: {error}");
        warn!("Using default configuration");
        FacepalmConfig::default()
    });

    if let Some(delay) = cli.delay_ms {
        config.mock.request_delay_ms = delay;
        config.channel.reply_delay_ms = delay;
    }
    if let Some(dir) = &cli.storage_dir {
        config.session.durable_dir = Some(dir.clone());
    }

    debug!("Effective configuration: {config:?}");
    config
}

/// Opens the session bridge over the configured durable directory
fn open_bridge(config: &FacepalmConfig) -> Result<CliBridge> {
    let durable_dir: PathBuf = config
        .session
        .resolve_durable_dir()
        .context("Failed to resolve durable storage directory")?;
    Ok(SessionBridge::from_config(
        &config.session,
        FileStore::new(durable_dir),
        MemoryStore::new(),
    ))
}

/// Writes one JSON line to stdout
fn emit(value: &JsonValue) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{value}")?;
    Ok(())
}

/// Replays a JSON-lines script through the mock backend
async fn handle_replay(config: &FacepalmConfig, input: &Path) -> Result<()> {
    let script = if input == Path::new("-") {
        let mut buffer = String::new();
        async_stdin()
            .read_to_string(&mut buffer)
            .await
            .context("Failed to read requests from stdin")?;
        buffer
    } else {
        async_fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))?
    };

    let backend = MockBackend::from_config(&config.mock)?;
    let mut bridge = open_bridge(config)?;

    for (index, raw_line) in script.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let entry: ReplayEntry = serde_json::from_str(line)
            .with_context(|| format!("Line {}: not a valid request", index + 1))?;
        let request = entry.into_request();

        let output = match backend.intercept(&request).await? {
            Some(response) => {
                // Mirrors the app persisting the session it receives from login.
                if response.is_success()
                    && let Ok(login) = response.decode::<LoginResponse>()
                {
                    bridge.save(&login.session)?;
                }
                let body = response
                    .json()
                    .unwrap_or_else(|_| JsonValue::String(response.body.clone()));
                json!({ "status": response.status, "body": body })
            }
            None => json!({ "passThrough": true, "url": request.url }),
        };
        emit(&output)?;
    }

    Ok(())
}

/// Sends availability queries and prints each reply
async fn handle_username(config: &FacepalmConfig, names: &[String]) -> Result<()> {
    let mut channel = AvailabilityChannel::from_config(&config.channel);

    for name in names {
        channel.query(name)?;
    }
    for _ in names {
        let response = channel.recv_response().await?;
        emit(&serde_json::to_value(&response)?)?;
    }

    Ok(())
}

/// Shows or clears the persisted session
fn handle_session(config: &FacepalmConfig, action: SessionAction) -> Result<()> {
    let mut bridge = open_bridge(config)?;

    match action {
        SessionAction::Show => match bridge.load_blob()? {
            Some(blob) => {
                let value: JsonValue =
                    serde_json::from_str(&blob).context("Stored session is not valid JSON")?;
                emit(&value)
            }
            None => emit(&JsonValue::Null),
        },
        SessionAction::Clear => {
            bridge.clear()?;
            emit(&json!({ "cleared": bridge.key() }))
        }
    }
}
