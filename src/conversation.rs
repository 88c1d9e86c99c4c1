//! Conversation engine
//!
//! Turns one submitted chat message into one completion call and, when that
//! call succeeds, one history write. The stored history grows by exactly two
//! messages per successful exchange and is left untouched otherwise.

use crate::error::{Result, SolaceError};
use crate::prompts::{language_instruction, render_system_prompt};
use crate::providers::{Message, Provider};
use crate::storage::UserStore;
use std::sync::Arc;

/// Result of a single chat submission
#[derive(Debug)]
pub enum ChatOutcome {
    /// The submitted text was blank; nothing happened
    Empty,
    /// The provider answered and the exchange was persisted
    Replied {
        /// The message the user sent
        user: Message,
        /// The provider's reply
        assistant: Message,
    },
    /// The provider call failed; nothing was persisted
    Failed(SolaceError),
}

impl ChatOutcome {
    /// Messages to show the user for this submission
    ///
    /// Never the full history: at most the latest exchange, or a single
    /// assistant-styled error line.
    ///
    /// # Examples
    ///
    /// ```
    /// use solace::conversation::ChatOutcome;
    /// use solace::error::SolaceError;
    /// use solace::providers::{Message, Role};
    ///
    /// assert!(ChatOutcome::Empty.display_messages().is_empty());
    ///
    /// let failed = ChatOutcome::Failed(SolaceError::Provider("quota".into()));
    /// let shown = failed.display_messages();
    /// assert_eq!(shown.len(), 1);
    /// assert_eq!(shown[0].role, Role::Assistant);
    /// assert!(shown[0].content.starts_with("Error: "));
    /// ```
    pub fn display_messages(&self) -> Vec<Message> {
        match self {
            Self::Empty => Vec::new(),
            Self::Replied { user, assistant } => vec![user.clone(), assistant.clone()],
            Self::Failed(error) => vec![Message::assistant(format!("Error: {}", error))],
        }
    }
}

/// Relays user messages to the completion provider and keeps history
pub struct ConversationEngine {
    store: Arc<UserStore>,
    provider: Arc<dyn Provider>,
}

impl ConversationEngine {
    /// Create an engine over a store and a provider
    pub fn new(store: Arc<UserStore>, provider: Arc<dyn Provider>) -> Self {
        Self { store, provider }
    }

    /// Handle one chat submission for `username`
    ///
    /// Provider failures are not errors here: they come back as
    /// [`ChatOutcome::Failed`] so the caller can display them.
    ///
    /// # Errors
    ///
    /// * `SolaceError::SessionInvalid` if the user no longer exists
    /// * `SolaceError::Storage` if the history cannot be read or written
    pub async fn send_message(&self, username: &str, user_text: &str) -> Result<ChatOutcome> {
        let text = user_text.trim();
        if text.is_empty() {
            return Ok(ChatOutcome::Empty);
        }

        let user = self
            .store
            .find_user(username)?
            .ok_or_else(|| SolaceError::SessionInvalid(username.to_string()))?;

        let mut history = user.history;
        if history.is_empty() {
            tracing::debug!("Seeding empty history for {}", username);
            history.push(render_system_prompt(&user.language));
        }

        let user_message = Message::user(text);
        history.push(user_message.clone());

        // The language reminder rides along with this request only.
        let mut request = history.clone();
        request.push(language_instruction(&user.language));

        tracing::debug!(
            "Requesting completion for {} with {} messages (model={})",
            username,
            request.len(),
            self.provider.model()
        );

        match self.provider.complete(&request).await {
            Ok(response) => {
                let assistant = Message::assistant(response.message.content);
                history.push(assistant.clone());
                self.store.update_history(username, &history)?;
                tracing::info!(
                    "Stored exchange for {} ({} messages)",
                    username,
                    history.len()
                );
                Ok(ChatOutcome::Replied {
                    user: user_message,
                    assistant,
                })
            }
            Err(err) => {
                tracing::warn!("Completion failed for {}: {}", username, err);
                let error = match err.downcast::<SolaceError>() {
                    Ok(known) => known,
                    Err(other) => SolaceError::Provider(other.to_string()),
                };
                Ok(ChatOutcome::Failed(error))
            }
        }
    }
}
