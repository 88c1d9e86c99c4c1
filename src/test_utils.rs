//! Test utilities for Solace
//!
//! Provides a scripted completion provider so conversation logic can be
//! exercised without network access.

use crate::error::{Result, SolaceError};
use crate::providers::{CompletionResponse, Message, Provider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Provider that answers every request the same way and records what it was
/// sent
pub struct StubProvider {
    reply: std::result::Result<String, String>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl StubProvider {
    /// Always reply with `content`
    pub fn replying(content: &str) -> Self {
        Self {
            reply: Ok(content.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with a provider error carrying `message`
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of completion calls received
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("stub lock poisoned").len()
    }

    /// Messages sent with the most recent call
    pub fn last_request(&self) -> Option<Vec<Message>> {
        self.requests
            .lock()
            .expect("stub lock poisoned")
            .last()
            .cloned()
    }
}

#[async_trait]
impl Provider for StubProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        self.requests
            .lock()
            .expect("stub lock poisoned")
            .push(messages.to_vec());

        match &self.reply {
            Ok(content) => Ok(CompletionResponse::new(Message::assistant(content.clone()))),
            Err(message) => Err(SolaceError::Provider(message.clone()).into()),
        }
    }

    fn model(&self) -> String {
        "stub-model".to_string()
    }
}
