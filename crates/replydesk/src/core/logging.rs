//! Logger initialization (console + file)

use simplelog::*;
use std::fs::File;

use super::error::{AppError, AppResult};

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// A log file that cannot be created surfaces as [`AppError::Io`].
pub fn init_logger(log_file_path: &str) -> AppResult<()> {
    let log_file = File::create(log_file_path)?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| AppError::Config(format!("Failed to initialize logger: {}", e)))?;

    Ok(())
}

/// Replace the bot token inside a Bot API URL so it can be logged.
pub fn mask_token(url: &str, token: &str) -> String {
    if token.is_empty() {
        return url.to_string();
    }
    url.replace(token, "***")
}
