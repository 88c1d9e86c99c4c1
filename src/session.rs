//! Signed-cookie sessions
//!
//! The session is a single cookie whose value is the username, signed with
//! the application key. Nothing is stored server-side; a cookie whose
//! signature fails to verify is treated as absent.

use crate::error::{Result, SolaceError};
use crate::storage::UserStore;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use rand::RngCore as _;
use sha2::{Digest, Sha512};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Build the cookie signing key
///
/// A configured secret is stretched to the 64 bytes the signer needs with
/// SHA-512, so the same secret always yields the same key and sessions
/// survive restarts. Without a secret a random key is generated.
pub fn signing_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => {
            let digest = Sha512::digest(secret.as_bytes());
            Key::from(digest.as_slice())
        }
        None => {
            tracing::warn!(
                "SECRET_KEY is not set; using a random signing key. Sessions will not survive a restart."
            );
            let mut bytes = [0u8; 64];
            rand::rng().fill_bytes(&mut bytes);
            Key::from(&bytes[..])
        }
    }
}

fn session_cookie(username: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, username.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Authenticate and bind the session to `username`
///
/// # Errors
///
/// Returns `SolaceError::AuthenticationFailure` for an unknown user or a
/// wrong password alike, and storage errors as-is.
pub fn login(
    store: &UserStore,
    jar: SignedCookieJar,
    username: &str,
    password: &str,
) -> Result<SignedCookieJar> {
    let username = username.trim();
    if !store.verify_password(username, password)? {
        tracing::info!("Rejected login attempt");
        return Err(SolaceError::AuthenticationFailure.into());
    }

    tracing::info!("User {} logged in", username);
    Ok(jar.add(session_cookie(username)))
}

/// Username carried by a valid session cookie
pub fn current_user(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|name| !name.is_empty())
}

/// Drop the session cookie
///
/// Safe to call without an active session.
pub fn logout(jar: SignedCookieJar) -> SignedCookieJar {
    if let Some(user) = current_user(&jar) {
        tracing::info!("User {} logged out", user);
    }
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
