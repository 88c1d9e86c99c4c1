//! Page templates
//!
//! Template sources live in `templates/` at the crate root.

use crate::providers::Message;
use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub username: Option<String>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupPage;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "chat.html")]
pub struct ChatPage {
    pub username: String,
    /// Preselected in the reply-language picker
    pub language: String,
    pub messages: Vec<Message>,
}

/// Render a template into an HTML response, or a 500 if rendering fails
pub fn render<T: Template>(page: &T) -> Response {
    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
