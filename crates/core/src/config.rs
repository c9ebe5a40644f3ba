//! Application configuration.
//!
//! Values come from `<config_dir>/car-rental/config.toml`, overlaid with
//! `CAR_RENTAL_*` environment variables (e.g. `CAR_RENTAL_STORAGE_ROOT`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::form::CANCEL_TOKEN;

const APP_DIR: &str = "car-rental";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "CAR_RENTAL";

/// Runtime settings for the storage root, logging and the bootstrap account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Directory holding `Cars/`, `Customers/` and `Users/`.
    pub storage_root: PathBuf,
    /// Directory receiving `car-rental.log`.
    pub log_dir: PathBuf,
    /// Input that abandons any prompt.
    pub cancel_token: String,
    /// Administrator created when the users file is empty.
    pub admin_username: String,
    /// Password of the bootstrap administrator.
    pub admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data = default_data_dir();
        Self {
            log_dir: data.join("logs"),
            storage_root: data,
            cancel_token: CANCEL_TOKEN.to_string(),
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from `path` (optional) and the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("storage_root", path_value(&defaults.storage_root))?
            .set_default("log_dir", path_value(&defaults.log_dir))?
            .set_default("cancel_token", defaults.cancel_token)?
            .set_default("admin_username", defaults.admin_username)?
            .set_default("admin_password", defaults.admin_password)?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let config: Self = settings
            .try_deserialize()
            .context("invalid configuration")?;
        if config.cancel_token.trim().is_empty() {
            anyhow::bail!("cancel_token must not be empty");
        }
        Ok(config)
    }
}

/// Location of the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Write a default config file on first run.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(&config_path())
}

/// Write a default config file at `path` unless one exists.
pub fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, default_template(&AppConfig::default()))
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// Literal strings keep Windows separators intact.
fn default_template(config: &AppConfig) -> String {
    format!(
        "# Car rental configuration\n\
         storage_root = '{}'\n\
         log_dir = '{}'\n\
         cancel_token = '{}'\n\
         \n\
         # Created only when the users file is empty.\n\
         admin_username = '{}'\n\
         admin_password = '{}'\n",
        config.storage_root.display(),
        config.log_dir.display(),
        config.cancel_token,
        config.admin_username,
        config.admin_password,
    )
}
