//! HTTP surface: webhook endpoint, admin login and dashboard.
//!
//! Route layout:
//! - public: `/`, `/health`, `/webhook`, `/login`, `/logout`
//! - behind [`auth::require_admin`]: `/admin`, `/message/{id}`, `/stats`

pub mod admin;
pub mod auth;
pub mod render;
pub mod webhook;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::config::AppConfig;
use crate::storage::db::DbPool;
use crate::telegram::Notifier;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(db: DbPool, config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            notifier,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/admin", get(admin::list_handler))
        .route("/message/{id}", get(admin::detail_handler).post(admin::reply_handler))
        .route("/stats", get(admin::stats_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/webhook", post(webhook::webhook_handler))
        .route("/login", get(auth::login_form_handler).post(auth::login_handler))
        .route("/logout", get(auth::logout_handler))
        .merge(protected)
        .with_state(state)
}

/// Start the HTTP server and run until it fails.
pub async fn start_web_server(state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = router(state);

    log::info!("Starting web server on http://{}", addr);
    log::info!("  /webhook       - Telegram updates (POST)");
    log::info!("  /login         - Admin login");
    log::info!("  /admin         - Message list");
    log::info!("  /message/{{id}}  - Message detail and reply");
    log::info!("  /stats         - Message totals");
    log::info!("  /health        - Health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET / — liveness text.
async fn index_handler() -> &'static str {
    "Bot is running"
}

/// GET /health — simple health check.
async fn health_handler() -> &'static str {
    "ok"
}
