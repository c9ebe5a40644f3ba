mod app;
mod prompt;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::Path,
    process::ExitCode,
};

use tracing_subscriber::{prelude::*, EnvFilter};
use rental_core::{
    config::{self, AppConfig},
    Accounts, RecordStore, StorageLayout,
};

const LOG_FILE: &str = "car-rental.log";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("fatal: {err:#}");
            eprintln!("car-rental stopped unexpectedly: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;
    tracing::info!(root = %config.storage_root.display(), "starting car rental");

    let layout = StorageLayout::new(&config.storage_root);
    layout
        .ensure()
        .context("failed to prepare the storage directory")?;
    let store = RecordStore::new(layout);
    Accounts::new(store.clone()).ensure_admin(&config.admin_username, &config.admin_password)?;

    let mut app = app::RentalApp::new(config, store);
    app.run()
}

fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join(LOG_FILE);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // No stdout layer: the terminal belongs to the UI.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
