//! HTTP surface for Solace
//!
//! Server-rendered pages only. The router composes the user store, the
//! session cookie helpers, and the conversation engine.

pub mod handlers;
pub mod views;

use crate::config::Config;
use crate::conversation::ConversationEngine;
use crate::error::{Result, SolaceError};
use crate::providers::Provider;
use crate::storage::UserStore;
use anyhow::Context;
use axum::extract::FromRef;
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::Key;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// User records and history
    pub store: Arc<UserStore>,
    /// Chat relay
    pub engine: Arc<ConversationEngine>,
    key: Key,
}

impl AppState {
    /// Assemble state from its parts
    pub fn new(store: Arc<UserStore>, provider: Arc<dyn Provider>, key: Key) -> Self {
        let engine = Arc::new(ConversationEngine::new(store.clone(), provider));
        Self { store, engine, key }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Build the application router
///
/// # Routes
///
/// - `GET /` landing page
/// - `GET|POST /signup`
/// - `GET|POST /login`
/// - `GET|POST /chat` (requires a session)
/// - `GET /logout`
/// - `/static/*` files from `static_dir`
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/signup", get(handlers::signup_page).post(handlers::signup))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/chat", get(handlers::chat_page).post(handlers::chat))
        .route("/logout", get(handlers::logout))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped
///
/// # Errors
///
/// Returns error if the address cannot be bound or the server fails
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = config.bind_addr()?;
    let app = build_router(state, &config.server.static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(SolaceError::from)
        .with_context(|| format!("Failed to bind {}", addr))?;

    let local = listener.local_addr().map_err(SolaceError::from)?;
    tracing::info!("Listening on http://{}", local);

    axum::serve(listener, app).await.map_err(SolaceError::from)?;
    Ok(())
}
