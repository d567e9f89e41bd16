/// Database connection and table creation
pub mod database;

/// Application settings and menu seed data from config.toml
pub mod app;

pub use app::{AppConfig, MenuSeed, load_config, load_default_config};
