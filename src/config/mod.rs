/// Database configuration and connection management
pub mod database;

/// Site settings and region policy overrides loaded from config.toml
pub mod settings;
