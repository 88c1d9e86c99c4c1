use crate::error::{Result, SolaceError};
use crate::prompts::{normalize_language, render_system_prompt};
use crate::providers::Message;
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod password;
pub mod types;
pub use types::UserRecord;

/// File name used when no database path is configured
pub const DEFAULT_DB_FILE: &str = "therapist_app.db";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable user store backed by SQLite
///
/// Every operation opens its own connection and closes it on return; there
/// are no long-lived transactions or locks.
#[derive(Debug, Clone)]
pub struct UserStore {
    db_path: PathBuf,
}

impl UserStore {
    /// Create a store in the user's data directory
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "solace", "solace")
            .ok_or_else(|| SolaceError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join(DEFAULT_DB_FILE))
    }

    /// Create a store that uses the specified database path.
    ///
    /// Parent directories are created as needed and the schema is applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use solace::storage::UserStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = UserStore::new_with_path(dir.path().join("users.db")).unwrap();
    /// assert!(store.find_user("nobody").unwrap().is_none());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for database")
                    .map_err(|e| SolaceError::Storage(e.to_string()))?;
            }
        }

        let store = Self { db_path };
        store.init()?;
        tracing::info!("User store ready at {}", store.db_path.display());
        Ok(store)
    }

    /// Location of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| SolaceError::Storage(e.to_string()))?;
        // Concurrent requests wait for the writer instead of failing with SQLITE_BUSY.
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")
            .map_err(|e| SolaceError::Storage(e.to_string()))?;
        Ok(conn)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                language TEXT DEFAULT 'en',
                history TEXT
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| SolaceError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Register a new user
    ///
    /// The password is hashed before it reaches the database, and the history
    /// is seeded with the persona prompt rendered for `language`.
    ///
    /// # Errors
    ///
    /// * `SolaceError::InvalidInput` if the username or password is empty
    /// * `SolaceError::DuplicateUser` if the username is taken
    /// * `SolaceError::Storage` for database failures
    pub fn create_user(&self, username: &str, password: &str, language: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(
                SolaceError::InvalidInput("Username and password are required.".into()).into(),
            );
        }

        if self.find_user(username)?.is_some() {
            return Err(SolaceError::DuplicateUser(username.to_string()).into());
        }

        let language = normalize_language(language);
        let password_hash = password::hash_password(password)?;
        let history_json = serde_json::to_string(&[render_system_prompt(&language)])
            .map_err(SolaceError::from)?;

        self.insert_user(username, &password_hash, &language, &history_json)?;
        tracing::info!("Created user {} (language={})", username, language);
        Ok(())
    }

    /// Insert a fully prepared row; the UNIQUE constraint is the final word
    /// on duplicates when two signups race past the existence check.
    fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        language: &str,
        history_json: &str,
    ) -> Result<()> {
        let conn = self.open()?;
        let inserted = conn.execute(
            "INSERT INTO users (username, password, language, history) VALUES (?, ?, ?, ?)",
            params![username, password_hash, language, history_json],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(SolaceError::DuplicateUser(username.to_string()).into())
            }
            Err(e) => Err(SolaceError::Storage(format!("Failed to insert user: {}", e)).into()),
        }
    }

    /// Look up a user by name
    pub fn find_user(&self, username: &str) -> Result<Option<UserRecord>> {
        let conn = self.open()?;

        let row = conn
            .query_row(
                "SELECT id, username, password, language, history FROM users WHERE username = ?",
                params![username],
                |row| {
                    let id: i64 = row.get(0)?;
                    let username: String = row.get(1)?;
                    let password_hash: String = row.get(2)?;
                    let language: Option<String> = row.get(3)?;
                    let history_json: Option<String> = row.get(4)?;
                    Ok((id, username, password_hash, language, history_json))
                },
            )
            .optional()
            .context("Failed to query user")
            .map_err(|e| SolaceError::Storage(e.to_string()))?;

        Ok(
            row.map(|(id, username, password_hash, language, history_json)| {
                let history = decode_history(&username, history_json.as_deref());
                UserRecord {
                    id,
                    username,
                    password_hash,
                    language: normalize_language(language.as_deref().unwrap_or_default()),
                    history,
                }
            }),
        )
    }

    /// Overwrite a user's stored history
    ///
    /// Last writer wins; there is no version check.
    pub fn update_history(&self, username: &str, history: &[Message]) -> Result<()> {
        let history_json = serde_json::to_string(history).map_err(SolaceError::from)?;

        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| SolaceError::Storage(e.to_string()))?;

        let updated = tx
            .execute(
                "UPDATE users SET history = ? WHERE username = ?",
                params![history_json, username],
            )
            .context("Failed to update history")
            .map_err(|e| SolaceError::Storage(e.to_string()))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| SolaceError::Storage(e.to_string()))?;

        if updated == 0 {
            tracing::warn!("History update for unknown user {}", username);
        } else {
            tracing::debug!("Saved {} messages for {}", history.len(), username);
        }

        Ok(())
    }

    /// Check a login attempt
    ///
    /// Unknown users and wrong passwords both return `false`.
    pub fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        Ok(self
            .find_user(username)?
            .is_some_and(|user| password::verify_password(password, &user.password_hash)))
    }

    /// Change a user's preferred language
    ///
    /// Only the per-request reply instruction picks this up; the stored
    /// persona prompt keeps the language it was rendered with.
    pub fn update_language(&self, username: &str, language: &str) -> Result<()> {
        let conn = self.open()?;
        let updated = conn
            .execute(
                "UPDATE users SET language = ? WHERE username = ?",
                params![normalize_language(language), username],
            )
            .context("Failed to update language")
            .map_err(|e| SolaceError::Storage(e.to_string()))?;
        if updated == 0 {
            tracing::warn!("Language update for unknown user {}", username);
        }
        Ok(())
    }
}

fn decode_history(username: &str, raw: Option<&str>) -> Vec<Message> {
    match raw {
        None => Vec::new(),
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable history for {}: {}", username, e);
            Vec::new()
        }),
    }
}
