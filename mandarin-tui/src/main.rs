mod app;
mod config;
mod ui;

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use config::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;
    init_logging(&settings)?;

    // optional first argument: account to open instead of the own profile
    let initial = std::env::args().nth(1).filter(|acc| !acc.trim().is_empty());
    tracing::info!(account = ?initial, base_url = %settings.api.base_url, "starting");

    let mut app = app::App::new(&settings, initial)?;
    app.run().await
}

/// The terminal belongs to the UI, so `tracing` writes to the cache log file.
fn init_logging(settings: &Settings) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config::paths::log_file()?)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!(
            "mandarin_tui={level},mandarin_core={level}",
            level = settings.log.level
        ))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
