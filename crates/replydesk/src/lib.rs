//! Replydesk - Telegram bot inbox with an admin reply dashboard
//!
//! Incoming chat messages arrive on a webhook and are stored in SQLite. An
//! administrator logs in to a small web dashboard, reads them and replies;
//! replies are sent back through the Bot API.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors and logging
//! - `storage`: connection pool, migrations, messages and admin sessions
//! - `telegram`: webhook payload parsing and the outbound notifier
//! - `web`: axum router, session guard and dashboard pages

pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;
pub mod web;

// Re-export commonly used types for convenience
pub use core::{AppConfig, AppError, AppResult};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
pub use telegram::{DeliveryOutcome, Notifier, TelegramNotifier};
pub use web::{router, AppState};
