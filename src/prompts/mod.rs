//! System prompts for the companion persona
//!
//! Prompts are rendered per user from that user's language. Nothing here
//! holds state: each call builds a fresh [`Message`].

use crate::providers::Message;

/// Language used when a signup form leaves the field blank
pub const DEFAULT_LANGUAGE: &str = "en";

/// Normalize a submitted language value, falling back to [`DEFAULT_LANGUAGE`]
///
/// # Examples
///
/// ```
/// use solace::prompts::normalize_language;
///
/// assert_eq!(normalize_language("  fr "), "fr");
/// assert_eq!(normalize_language(""), "en");
/// ```
pub fn normalize_language(language: &str) -> String {
    let trimmed = language.trim();
    if trimmed.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds the persona system message that opens every history
///
/// Called once at signup, and again only when a stored history has to be
/// reseeded.
///
/// # Arguments
///
/// * `language` - The language the assistant should speak
///
/// # Examples
///
/// ```
/// use solace::prompts::render_system_prompt;
/// use solace::providers::Role;
///
/// let prompt = render_system_prompt("es");
/// assert_eq!(prompt.role, Role::System);
/// assert!(prompt.content.contains("always speaks in es"));
/// ```
pub fn render_system_prompt(language: &str) -> Message {
    Message::system(format!(
        "You are a kind, empathetic CBT therapist and friend who always speaks in {}. \
         You talk like the user to make them feel comfortable and understood. \
         Keep responses short, empathetic, and comforting. You listen more than you speak.",
        normalize_language(language)
    ))
}

/// Builds the per-request reminder appended after the history
///
/// This message is sent with each completion request and never stored.
///
/// # Examples
///
/// ```
/// use solace::prompts::language_instruction;
///
/// assert_eq!(language_instruction("de").content, "Reply in de.");
/// ```
pub fn language_instruction(language: &str) -> Message {
    Message::system(format!("Reply in {}.", normalize_language(language)))
}
