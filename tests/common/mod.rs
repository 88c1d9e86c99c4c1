#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use solace::config::ProviderConfig;
use solace::providers::{CompletionResponse, GroqProvider, Message, Provider};
use solace::server::{build_router, AppState};
use solace::session::signing_key;
use solace::{SolaceError, UserStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// A running router plus the store behind it
pub struct TestApp {
    pub router: Router,
    pub store: Arc<UserStore>,
    _dir: TempDir,
}

impl TestApp {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self::with_secret(provider, TEST_SECRET)
    }

    pub fn with_secret(provider: Arc<dyn Provider>, secret: &str) -> Self {
        let dir = TempDir::new().expect("failed to create tempdir");
        let static_dir = dir.path().join("static");
        std::fs::create_dir_all(&static_dir).expect("failed to create static dir");
        std::fs::write(static_dir.join("style.css"), "body {}").expect("failed to write css");

        let store = Arc::new(
            UserStore::new_with_path(dir.path().join("users.db")).expect("failed to open store"),
        );
        let state = AppState::new(store.clone(), provider, signing_key(Some(secret)));
        let router = build_router(state, &static_dir);

        Self {
            router,
            store,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Sign up and log in, returning the `session=...` cookie pair
    pub async fn signup_and_login(&self, username: &str, password: &str) -> String {
        let body = format!("username={}&password={}&language=en", username, password);
        let response = self.post_form("/signup", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let body = format!("username={}&password={}", username, password);
        let response = self.post_form("/login", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/chat"));
        session_cookie(&response).expect("login sets a session cookie")
    }
}

/// `name=value` part of the session Set-Cookie header, if any
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Full Set-Cookie header for the session cookie, attributes included
pub fn session_set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is utf-8")
}

/// Provider pointed at a mock chat-completions server
pub fn groq_provider(api_base: &str) -> Arc<dyn Provider> {
    let config = ProviderConfig {
        api_base: api_base.to_string(),
        model: "llama3-70b-8192".to_string(),
        api_key: Some("gsk_test".to_string()),
    };
    Arc::new(GroqProvider::new(config).expect("failed to build provider"))
}

/// Provider that always gives the same answer and counts calls
pub struct CannedProvider {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl CannedProvider {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for CannedProvider {
    async fn complete(&self, _messages: &[Message]) -> solace::Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(CompletionResponse::new(Message::assistant(reply.clone()))),
            None => Err(SolaceError::Provider("service unavailable".to_string()).into()),
        }
    }

    fn model(&self) -> String {
        "canned".to_string()
    }
}
