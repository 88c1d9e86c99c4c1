//! Command-line interface definition for Solace
//!
//! The binary has a single job, serving the web application, so the CLI is a
//! flat set of overrides on top of the configuration file.

use clap::Parser;

/// Solace - session-authenticated chat relay
///
/// Serves the signup, login, and chat pages and relays each chat message to
/// the configured completion API.
#[derive(Parser, Debug, Clone)]
#[command(name = "solace")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the listen address (e.g. 0.0.0.0:5000)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Override the user database path
    #[arg(long)]
    pub db_path: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "solace=debug,tower_http=debug"
        } else {
            "solace=info,tower_http=info"
        }
    }
}
