//! # Configuration Loader / 配置加载器
//!
//! Reads `config.toml` into [`RoboLinkConfig`]. Missing keys fall back to
//! their defaults; no other validation happens here.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rl_core::RoboLinkConfig;
use tracing::info;

/// `<config_dir>/robolink/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("robolink").join("config.toml"))
}

/// Load configuration from a TOML file.
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid configuration TOML.
pub fn load_config(config_path: &Path) -> anyhow::Result<RoboLinkConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    RoboLinkConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

/// Pick the configuration to run with.
///
/// An explicit path must load. The default location is optional: when it
/// does not exist the built-in defaults are used.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<RoboLinkConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => load_config(&path),
        _ => {
            info!("No config file found, using defaults");
            Ok(RoboLinkConfig::default())
        }
    }
}
