//! Application configuration loading from config.toml
//!
//! The file holds the repository settings (operation timeout, admin emails) and
//! an optional `[[menu]]` list used to seed the menu on startup. Every key is
//! optional; a missing file yields the defaults.

use crate::core::RepositorySettings;
use crate::errors::{Error, Result};
use crate::models::{MealType, MenuItem};
use chrono::NaiveDate;
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::{debug, info};

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "MESSMATE_CONFIG";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Upper bound for every repository call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub operation_timeout_secs: u64,
    /// Accounts allowed to edit the menu and triage feedback
    #[serde(default)]
    pub admin_emails: Vec<String>,
    /// Menu items inserted at startup when missing
    #[serde(default)]
    pub menu: Vec<MenuSeed>,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            operation_timeout_secs: DEFAULT_TIMEOUT_SECS,
            admin_emails: Vec::new(),
            menu: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Repository settings built from the timeout and admin list.
    #[must_use]
    pub fn settings(&self) -> RepositorySettings {
        RepositorySettings::new(
            Duration::from_secs(self.operation_timeout_secs),
            self.admin_emails.iter().cloned(),
        )
    }
}

/// One seeded menu entry
#[derive(Debug, Clone, Deserialize)]
pub struct MenuSeed {
    /// Dish name
    pub name: String,
    /// Meal the dish is served at
    pub category: MealType,
    /// Price in the local currency
    pub price: f64,
    /// Optional free text
    #[serde(default)]
    pub description: String,
    /// Defaults to true
    #[serde(default = "default_available")]
    pub available: bool,
    /// Day the dish is served
    pub date: NaiveDate,
}

const fn default_available() -> bool {
    true
}

impl From<&MenuSeed> for MenuItem {
    fn from(seed: &MenuSeed) -> Self {
        Self {
            description: seed.description.clone(),
            is_available: seed.available,
            ..Self::new(seed.name.clone(), seed.category, seed.price, seed.date)
        }
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or a value has the wrong type (unknown meal, malformed date).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {path_ref:?}: {e}"),
    })
}

/// Loads `$MESSMATE_CONFIG` or `./config.toml`, falling back to defaults when the
/// file does not exist.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        info!("No config file at {}, using defaults.", path);
        return Ok(AppConfig::default());
    }
    load_config(path)
}
