//! Shared fixtures for the web integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use secrecy::SecretString;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

use replydesk::core::AppConfig;
use replydesk::storage::{create_pool, get_connection, DbConnection, DbPool};
use replydesk::telegram::{DeliveryOutcome, Notifier};
use replydesk::web::{router, AppState};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// Notifier that records every call and answers with a fixed outcome.
pub struct RecordingNotifier {
    pub outcome: DeliveryOutcome,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new(outcome: DeliveryOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, recipient: &str, text: &str) -> DeliveryOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((recipient.to_string(), text.to_string()));
        self.outcome.clone()
    }
}

pub struct TestApp {
    pub app: Router,
    pub pool: Arc<DbPool>,
    pub notifier: Arc<RecordingNotifier>,
    _dir: TempDir,
}

pub fn test_config(database_path: &str, webhook_secret: Option<&str>) -> AppConfig {
    AppConfig {
        secret_key: SecretString::from("test-secret-key"),
        database_path: database_path.to_string(),
        bot_token: SecretString::from("123:TEST"),
        telegram_api_url: "http://127.0.0.1:9".to_string(),
        admin_username: ADMIN_USERNAME.to_string(),
        admin_password: SecretString::from(ADMIN_PASSWORD),
        webhook_secret: webhook_secret.map(str::to_string),
        port: 0,
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(DeliveryOutcome::Delivered, None)
    }

    pub fn build(outcome: DeliveryOutcome, webhook_secret: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let path = path.to_str().unwrap();

        let pool = create_pool(path).unwrap();
        let notifier = Arc::new(RecordingNotifier::new(outcome));
        let state = AppState::new(pool, test_config(path, webhook_secret), notifier.clone());
        let pool = state.db.clone();

        Self {
            app: router(state),
            pool,
            notifier,
            _dir: dir,
        }
    }

    pub fn conn(&self) -> DbConnection {
        get_connection(&self.pool).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap()).await
    }

    pub async fn post_webhook(&self, body: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Log in and return the `name=value` pair to send back as a Cookie header.
    pub async fn login(&self) -> String {
        let form = format!("username={}&password={}", ADMIN_USERNAME, "correct+horse");
        let response = self.post_form("/login", &form, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login sets a cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
