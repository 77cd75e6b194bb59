//! Application configuration module.
//!
//! Manages the TOML config file (catalog endpoint, analytics store,
//! search tuning) and the default config/log locations.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::AppConfig;
pub use paths::{resolve_config_path, resolve_log_path};
