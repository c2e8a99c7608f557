//! Application configuration.
//!
//! Layering, lowest to highest precedence:
//! 1. built-in defaults
//! 2. the TOML config file (optional)
//! 3. `FACEWATCH__SECTION__KEY` environment variables

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::alert::AlertConfig;
use crate::engine::LocalEngineConfig;
use crate::session::SessionConfig;

pub const APP_NAME: &str = "facewatch";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profile: String,
    pub logging: LoggingConfig,
    pub assets: AssetsConfig,
    pub session: SessionConfig,
    pub alert: AlertConfig,
    pub engine: LocalEngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory holding `Models/*.param` and `Models/*.bin`.
    pub dir: Option<String>,
}

impl AppConfig {
    /// Load from `path` (if it exists) and the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load with an explicit environment map instead of the process
    /// environment.
    pub fn load_with_env(path: &Path, env: Option<config::Map<String, String>>) -> Result<Self> {
        let built = Config::builder()
            .set_default("profile", "default")?
            .set_default("logging.level", "info")?
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(&env_prefix())
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("reading config from {}", path.display()))?;

        let config: Self = built
            .try_deserialize()
            .with_context(|| format!("parsing config from {}", path.display()))?;
        config
            .alert
            .validate()
            .map_err(|err| anyhow!("invalid config {}: {err}", path.display()))?;
        Ok(config)
    }

    /// Resolved assets directory, with `~` and env vars expanded.
    pub fn assets_dir(&self) -> Result<Option<PathBuf>> {
        self.assets.dir.as_deref().map(expand_str_path).transpose()
    }
}

/// Write the default config with a short header.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {parent:?}"))?;
    }

    let config = AppConfig {
        profile: "default".to_string(),
        ..AppConfig::default()
    };
    let toml = toml::to_string_pretty(&config).context("serializing default config to TOML")?;
    let mut body = String::new();
    body.push_str("# Configuration for ");
    body.push_str(APP_NAME);
    body.push('\n');
    body.push_str("# File: ");
    body.push_str(&path.display().to_string());
    body.push_str("\n\n");
    body.push_str(&toml);
    fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))
}

/// Resolve the config file: an explicit path (or directory), else the XDG
/// config dir.
pub fn resolve_config_file(override_path: Option<PathBuf>) -> Result<PathBuf> {
    let config_file = match override_path {
        Some(path) => {
            let expanded = expand_path(path)?;
            if expanded.is_dir() {
                expanded.join("config.toml")
            } else {
                expanded
            }
        }
        None => default_config_dir()?.join("config.toml"),
    };

    if config_file.parent().is_none() {
        return Err(anyhow!("invalid config file path: {config_file:?}"));
    }
    Ok(config_file)
}

fn expand_path(path: PathBuf) -> Result<PathBuf> {
    if let Some(text) = path.to_str() {
        expand_str_path(text)
    } else {
        Ok(path)
    }
}

fn expand_str_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text).context("expanding path")?;
    Ok(PathBuf::from(expanded.to_string()))
}

fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}

fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_prefix_is_uppercase_app_name() {
        assert_eq!(env_prefix(), "FACEWATCH");
    }

    #[test]
    fn directory_override_resolves_to_config_toml() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_config_file(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(resolved, dir.path().join("config.toml"));
    }
}
