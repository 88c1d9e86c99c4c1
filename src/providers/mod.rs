//! Provider module for Solace
//!
//! This module contains the completion provider abstraction and the
//! chat-completions client used in production.

pub mod base;
pub mod groq;

pub use base::{CompletionResponse, Message, Provider, Role, TokenUsage};
pub use groq::GroqProvider;

use crate::config::ProviderConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the configured provider
///
/// # Errors
///
/// Returns error if provider initialization fails (for example a missing
/// API key)
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(GroqProvider::new(config.clone())?))
}
