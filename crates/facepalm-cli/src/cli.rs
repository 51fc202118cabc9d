use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the facepalm mock backend
#[derive(Debug, Parser)]
#[command(name = "facepalm")]
#[command(about = "Drive the facepalm mock backend from the command line", long_about = None)]
pub struct Cli {
    /// Configuration file [default: ~/.facepalm/config.toml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for durable session storage (overrides the config file)
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Simulated latency in milliseconds for requests and channel replies
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Action to perform
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level actions
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay JSON-lines requests through the interceptor
    Replay {
        /// File with one `{method, url, body?}` object per line, or `-` for stdin
        input: PathBuf,
    },
    /// Ask the availability channel whether usernames are free
    Username {
        /// Usernames to check
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Inspect or remove the persisted session
    Session {
        /// Session action
        #[command(subcommand)]
        action: SessionAction,
    },
}

/// Session subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum SessionAction {
    /// Print the stored session blob
    Show,
    /// Remove the session from all storage
    Clear,
}
