//! Solace - session-authenticated chat relay
//!
//! Main entry point: loads configuration, opens the user store, and serves
//! the web application.

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use solace::cli::Cli;
use solace::config::Config;
use solace::providers::create_provider;
use solace::server::{self, AppState};
use solace::session::signing_key;
use solace::storage::UserStore;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal in production.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse_args();
    init_tracing(cli.default_log_filter(), cli.json_logs);

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = Config::load(&cli.config, &cli)?;

    // Aborts startup when GROQ_API_KEY is missing.
    config.validate()?;

    let store = match &config.storage.db_path {
        Some(path) => UserStore::new_with_path(path)?,
        None => UserStore::new()?,
    };

    let provider = create_provider(&config.provider)?;
    let key = signing_key(config.session.secret_key.as_deref());
    let state = AppState::new(Arc::new(store), provider, key);

    tracing::info!("Starting Solace");
    server::serve(&config, state).await
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins over `default_filter` when set.
fn init_tracing(default_filter: &str, json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
