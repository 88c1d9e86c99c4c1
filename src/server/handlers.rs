//! Route handlers

use super::views::{render, ChatPage, HomePage, LoginPage, SignupPage};
use super::AppState;
use crate::error::{Result, SolaceError};
use crate::prompts::normalize_language;
use crate::session;
use crate::storage::UserRecord;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

const LOGIN_FAILED: &str = "Invalid credentials. Please try again.";

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
    /// Switches the reply language when non-blank
    #[serde(default)]
    pub language: String,
}

fn internal_error(err: anyhow::Error) -> Response {
    tracing::error!("Request failed: {:#}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// Run password hashing and store work off the async workers
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SolaceError::Storage(format!("Blocking task failed: {}", e)))?
}

/// Resolve the signed-in user, or the redirect to send instead
fn require_user(
    state: &AppState,
    jar: &SignedCookieJar,
) -> std::result::Result<UserRecord, Response> {
    let username =
        session::current_user(jar).ok_or_else(|| Redirect::to("/login").into_response())?;

    match state.store.find_user(&username) {
        Ok(Some(user)) => Ok(user),
        Ok(None) => {
            tracing::warn!("Session names missing user {}; clearing", username);
            Err(Redirect::to("/logout").into_response())
        }
        Err(e) => Err(internal_error(e)),
    }
}

pub async fn home(jar: SignedCookieJar) -> Response {
    render(&HomePage {
        username: session::current_user(&jar),
    })
}

pub async fn signup_page() -> Response {
    render(&SignupPage)
}

pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let store = state.store.clone();
    let created =
        blocking(move || store.create_user(&form.username, &form.password, &form.language)).await;

    match created {
        Ok(()) => Redirect::to("/login").into_response(),
        Err(err) => match err.downcast_ref::<SolaceError>() {
            Some(SolaceError::InvalidInput(_)) => (
                StatusCode::BAD_REQUEST,
                "Username and password are required.",
            )
                .into_response(),
            Some(SolaceError::DuplicateUser(_)) => {
                (StatusCode::BAD_REQUEST, "Username already exists.").into_response()
            }
            _ => internal_error(err),
        },
    }
}

pub async fn login_page() -> Response {
    render(&LoginPage { error: None })
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let store = state.store.clone();
    let logged_in =
        blocking(move || session::login(&store, jar, &form.username, &form.password)).await;

    match logged_in {
        Ok(jar) => (jar, Redirect::to("/chat")).into_response(),
        Err(err) => match err.downcast_ref::<SolaceError>() {
            Some(SolaceError::AuthenticationFailure) => render(&LoginPage {
                error: Some(LOGIN_FAILED.to_string()),
            }),
            _ => internal_error(err),
        },
    }
}

pub async fn chat_page(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    match require_user(&state, &jar) {
        Ok(user) => render(&ChatPage {
            username: user.username,
            language: user.language,
            messages: Vec::new(),
        }),
        Err(redirect) => redirect,
    }
}

pub async fn chat(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<ChatForm>,
) -> Response {
    let user = match require_user(&state, &jar) {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let mut language = user.language;
    if !form.language.trim().is_empty() {
        language = normalize_language(&form.language);
        if let Err(err) = state.store.update_language(&user.username, &language) {
            return internal_error(err);
        }
    }

    match state.engine.send_message(&user.username, &form.message).await {
        Ok(outcome) => render(&ChatPage {
            username: user.username,
            language,
            messages: outcome.display_messages(),
        }),
        Err(err) => match err.downcast_ref::<SolaceError>() {
            Some(SolaceError::SessionInvalid(_)) => Redirect::to("/logout").into_response(),
            _ => internal_error(err),
        },
    }
}

pub async fn logout(jar: SignedCookieJar) -> Response {
    (session::logout(jar), Redirect::to("/")).into_response()
}
