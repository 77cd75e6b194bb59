//! Config and log file resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Resolves the config file path.
///
/// - If `dir` is `Some`, returns `{dir}/config.toml`.
/// - Otherwise returns `~/.config/moviefind/config.toml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join("config.toml"));
    }

    Ok(home_dir()?
        .join(".config")
        .join("moviefind")
        .join("config.toml"))
}

/// Resolves the log file written while the TUI owns the terminal.
///
/// - If `dir` is `Some`, returns `{dir}/moviefind.log`.
/// - Otherwise returns `~/.local/share/moviefind/moviefind.log`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_log_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join("moviefind.log"));
    }

    Ok(home_dir()?
        .join(".local")
        .join("share")
        .join("moviefind")
        .join("moviefind.log"))
}

fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home))
}
