use once_cell::sync::Lazy;
use secrecy::SecretString;
use std::env;

use crate::core::error::{AppError, AppResult};

/// Key used to sign admin session cookies
/// Read from SECRET_KEY environment variable
pub static SECRET_KEY: Lazy<Option<String>> = Lazy::new(|| non_empty_var("SECRET_KEY"));

/// Database location
/// Read from DATABASE_URL environment variable
/// Default: sqlite:///bot.db (SQLite file next to the process)
pub static DATABASE_URL: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:///bot.db".to_string()));

/// Bot token
/// Read from BOT_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| env::var("BOT_TOKEN").unwrap_or_else(|_| String::new()));

/// Bot API base URL, overridable for a local Bot API server
/// Read from TELEGRAM_API_URL environment variable
pub static TELEGRAM_API_URL: Lazy<String> = Lazy::new(|| {
    env::var("TELEGRAM_API_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| "https://api.telegram.org".to_string())
});

/// Shared secret Telegram echoes in the X-Telegram-Bot-Api-Secret-Token header
/// Read from WEBHOOK_SECRET environment variable, unset disables the check
pub static WEBHOOK_SECRET: Lazy<Option<String>> = Lazy::new(|| non_empty_var("WEBHOOK_SECRET"));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: replydesk.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "replydesk.log".to_string()));

/// HTTP port for the webhook and dashboard
/// Read from WEB_PORT environment variable
/// Default: 5000
pub static WEB_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("WEB_PORT")
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(5000)
});

/// Admin dashboard credentials
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    /// Read from ADMIN_USERNAME environment variable
    pub static ADMIN_USERNAME: Lazy<String> =
        Lazy::new(|| env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()));

    /// Read from ADMIN_PASSWORD environment variable
    /// Empty disables dashboard login entirely
    pub static ADMIN_PASSWORD: Lazy<String> =
        Lazy::new(|| env::var("ADMIN_PASSWORD").unwrap_or_else(|_| String::new()));
}

/// Admin session configuration
pub mod session {
    use chrono::Duration;

    /// Cookie carrying the signed session token
    pub const COOKIE_NAME: &str = "replydesk_session";

    /// Days a session stays valid after login
    pub const LIFETIME_DAYS: i64 = 31;

    pub fn lifetime() -> Duration {
        Duration::days(LIFETIME_DAYS)
    }
}

/// Network configuration
pub mod network {
    use std::time::Duration;

    /// Timeout for outbound Bot API requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Resolve a DATABASE_URL into a SQLite file path.
///
/// `sqlite:///bot.db` is relative to the working directory, `sqlite:////var/db/bot.db`
/// is absolute, and a bare path is used unchanged.
pub fn sqlite_path_from_url(url: &str) -> AppResult<String> {
    let url = url.trim();
    if let Some(rest) = url.strip_prefix("sqlite:///") {
        if rest.is_empty() {
            return Err(AppError::Config("DATABASE_URL has no database file".to_string()));
        }
        return Ok(rest.to_string());
    }
    if url.starts_with("sqlite:") {
        return Err(AppError::Config(format!(
            "Unsupported SQLite URL '{}', expected sqlite:///path",
            url
        )));
    }
    if url.contains("://") {
        return Err(AppError::Config(format!(
            "Only SQLite databases are supported, got '{}'",
            url.split("://").next().unwrap_or_default()
        )));
    }
    if url.is_empty() {
        return Err(AppError::Config("DATABASE_URL is empty".to_string()));
    }
    Ok(url.to_string())
}

/// Runtime settings for the web application.
///
/// Built from the environment in production and by hand in tests.
#[derive(Debug)]
pub struct AppConfig {
    pub secret_key: SecretString,
    pub database_path: String,
    pub bot_token: SecretString,
    pub telegram_api_url: String,
    pub admin_username: String,
    pub admin_password: SecretString,
    pub webhook_secret: Option<String>,
    pub port: u16,
}

impl AppConfig {
    /// Snapshot of the environment-backed statics.
    ///
    /// A missing SECRET_KEY falls back to a random per-process key, which logs every
    /// admin out on restart.
    pub fn from_env() -> AppResult<Self> {
        let secret_key = match SECRET_KEY.as_ref() {
            Some(key) => key.clone(),
            None => {
                log::warn!("SECRET_KEY not set, generating a temporary key (sessions end on restart)");
                uuid::Uuid::new_v4().simple().to_string()
            }
        };

        if BOT_TOKEN.is_empty() {
            log::warn!("BOT_TOKEN not set, replies will not be delivered");
        }
        if admin::ADMIN_PASSWORD.is_empty() {
            log::warn!("ADMIN_PASSWORD not set, dashboard login is disabled");
        }

        Ok(Self {
            secret_key: SecretString::from(secret_key),
            database_path: sqlite_path_from_url(&DATABASE_URL)?,
            bot_token: SecretString::from(BOT_TOKEN.clone()),
            telegram_api_url: TELEGRAM_API_URL.clone(),
            admin_username: admin::ADMIN_USERNAME.clone(),
            admin_password: SecretString::from(admin::ADMIN_PASSWORD.clone()),
            webhook_secret: WEBHOOK_SECRET.clone(),
            port: *WEB_PORT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url_relative_path() {
        assert_eq!(sqlite_path_from_url("sqlite:///bot.db").unwrap(), "bot.db");
    }

    #[test]
    fn test_sqlite_url_absolute_path() {
        assert_eq!(sqlite_path_from_url("sqlite:////var/lib/bot.db").unwrap(), "/var/lib/bot.db");
    }

    #[test]
    fn test_bare_path_is_accepted() {
        assert_eq!(sqlite_path_from_url("data/bot.db").unwrap(), "data/bot.db");
    }

    #[test]
    fn test_non_sqlite_url_is_rejected() {
        let err = sqlite_path_from_url("postgresql://user@host/db").unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("postgresql")));
    }

    #[test]
    fn test_malformed_sqlite_url_is_rejected() {
        assert!(sqlite_path_from_url("sqlite://bot.db").is_err());
        assert!(sqlite_path_from_url("sqlite:///").is_err());
        assert!(sqlite_path_from_url("   ").is_err());
    }

    #[test]
    fn test_session_lifetime() {
        assert_eq!(session::lifetime().num_days(), 31);
    }
}
