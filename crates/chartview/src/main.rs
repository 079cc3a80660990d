use anyhow::Result;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

use chartview::{start_gallery_server, CHARTS_DIR, GALLERY_PORT};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    start_gallery_server(*GALLERY_PORT, PathBuf::from(CHARTS_DIR.as_str())).await
}
