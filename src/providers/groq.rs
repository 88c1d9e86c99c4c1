//! Groq provider implementation for Solace
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint. Groq is the
//! default target, but any server speaking the same wire format can be used
//! by changing `provider.api_base`.

use crate::config::ProviderConfig;
use crate::error::{Result, SolaceError};
use crate::providers::{CompletionResponse, Message, Provider, Role, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Chat-completions API provider
///
/// The HTTP client is built without a request timeout: a single call is made
/// per user message and it is allowed to take as long as the upstream takes.
///
/// # Examples
///
/// ```no_run
/// use solace::config::ProviderConfig;
/// use solace::providers::{GroqProvider, Message, Provider};
///
/// # async fn example() -> solace::error::Result<()> {
/// let config = ProviderConfig {
///     api_key: Some("gsk_...".to_string()),
///     ..Default::default()
/// };
/// let provider = GroqProvider::new(config)?;
/// let completion = provider.complete(&[Message::user("Hello!")]).await?;
/// println!("{}", completion.message.content);
/// # Ok(())
/// # }
/// ```
pub struct GroqProvider {
    client: Client,
    config: ProviderConfig,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

/// Response body from `/chat/completions`
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

/// Error envelope returned by OpenAI-compatible APIs on failure
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GroqProvider {
    /// Create a new provider instance
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the HTTP client cannot be
    /// built
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.api_key.as_deref().map_or(true, |k| k.is_empty()) {
            return Err(SolaceError::Config("Completion API key is not configured".into()).into());
        }

        let client = Client::builder()
            .user_agent(concat!("solace/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SolaceError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized completion provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    /// Pull the human-readable message out of an error body, falling back to
    /// the raw text when it is not the usual `{"error": {"message": ..}}`.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ApiErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| body.to_string())
    }
}

#[async_trait]
impl Provider for GroqProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
        };

        tracing::debug!("Sending completion request: {} messages", messages.len());

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}", e);
                SolaceError::Provider(format!("Completion request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = Self::error_message(&body);
            tracing::error!("Completion API returned error {}: {}", status, detail);
            return Err(SolaceError::Provider(format!(
                "Completion API returned error {}: {}",
                status, detail
            ))
            .into());
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            SolaceError::Provider(format!("Failed to parse completion response: {}", e))
        })?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                SolaceError::Provider("Completion response contained no choices".to_string())
            })?;

        if let Some(u) = &usage {
            tracing::debug!(
                "Completion usage: prompt_tokens={}, completion_tokens={}",
                u.prompt_tokens,
                u.completion_tokens
            );
        }

        let message = Message {
            role: Role::Assistant,
            content,
        };
        Ok(match usage {
            Some(u) => CompletionResponse::with_usage(message, u),
            None => CompletionResponse::new(message),
        })
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}
