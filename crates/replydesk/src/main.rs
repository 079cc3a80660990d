use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;

use replydesk::cli::{Cli, Commands};
use replydesk::core::{config, init_logger, AppConfig};
use replydesk::storage::create_pool;
use replydesk::telegram::TelegramNotifier;
use replydesk::web::{start_web_server, AppState};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the requested subcommand; with no
/// subcommand the web server runs.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present, before any config static is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Serve { port }) => run_server(port).await,
        Some(Commands::Migrate) => run_migrate(),
        Some(Commands::SetWebhook { url }) => run_set_webhook(&url).await,
        None => run_server(None).await,
    }
}

async fn run_server(port: Option<u16>) -> Result<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }

    let pool = create_pool(&config.database_path)?;
    log::info!("Database ready at {}", config.database_path);

    let notifier = TelegramNotifier::new(&config.telegram_api_url, &config.bot_token)?;
    let state = AppState::new(pool, config, Arc::new(notifier));

    start_web_server(state).await
}

fn run_migrate() -> Result<()> {
    let path = config::sqlite_path_from_url(&config::DATABASE_URL)?;
    create_pool(&path)?;
    log::info!("Database {} is up to date", path);
    Ok(())
}

async fn run_set_webhook(url: &str) -> Result<()> {
    let config = AppConfig::from_env()?;
    if config.webhook_secret.is_none() {
        log::warn!("WEBHOOK_SECRET not set, /webhook will accept unauthenticated calls");
    }

    let notifier = TelegramNotifier::new(&config.telegram_api_url, &config.bot_token)?;
    notifier.set_webhook(url, config.webhook_secret.as_deref()).await?;
    Ok(())
}
