//! Error types for Solace
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Solace operations
///
/// Every failure the application can recover from has a variant here, so
/// handlers can match on the kind and pick the right response (a 400, a
/// re-rendered form, a redirect, or a displayed chat error).
#[derive(Error, Debug)]
pub enum SolaceError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or empty required input (username, password)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Signup attempted with a username that is already taken
    #[error("Username already exists: {0}")]
    DuplicateUser(String),

    /// Login credentials did not match a stored user
    ///
    /// Deliberately carries no detail about which part was wrong.
    #[error("Invalid credentials")]
    AuthenticationFailure,

    /// Session cookie names a user that no longer exists
    #[error("Session refers to unknown user: {0}")]
    SessionInvalid(String),

    /// Completion API errors (network, quota, invalid key, bad response)
    #[error("Provider error: {0}")]
    Provider(String),

    /// User store errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Password hashing errors
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Solace operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation. Callers that
/// need the kind downcast to [`SolaceError`].
pub type Result<T> = anyhow::Result<T>;
