//! Solace - session-authenticated chat relay library
//!
//! This library provides the pieces of the Solace web application: a SQLite
//! user store with hashed passwords and per-user history, signed-cookie
//! sessions, a conversation engine that forwards history to a
//! chat-completions API, and the axum router that serves it all.
//!
//! # Architecture
//!
//! - `storage`: user records, password hashing, history persistence
//! - `session`: signed session cookie login/logout
//! - `conversation`: one completion call per chat message, history updates
//! - `providers`: completion provider trait and the chat-completions client
//! - `prompts`: persona and language prompts
//! - `server`: routes, handlers, and page templates
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use solace::{Config, UserStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let cli = solace::cli::Cli::parse_args();
//!     let config = Config::load("config/config.yaml", &cli)?;
//!     config.validate()?;
//!
//!     let store = UserStore::new()?;
//!     store.create_user("alice", "pw123", "en")?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod server;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{ChatOutcome, ConversationEngine};
pub use error::{Result, SolaceError};
pub use server::{build_router, AppState};
pub use storage::{UserRecord, UserStore};

#[cfg(test)]
pub mod test_utils;
