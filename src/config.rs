//! Application configuration. Everything lives in an optional
//! `tool_lending.toml` next to the executable; a missing file or missing keys
//! fall back to defaults so a fresh install needs no setup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

use crate::messages::Locale;

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "tool_lending.toml";
/// SQLite snapshot file name.
pub const SQLITE_FILE_NAME: &str = "tool_lending.sqlite";
/// JSON snapshot file name, shared with data files from earlier releases.
pub const JSON_FILE_NAME: &str = "tool_lending_data.json";
/// Append-only lend/return history.
pub const AUDIT_FILE_NAME: &str = "tool_lending_history.log";
/// Diagnostic log written by `tracing`.
pub const DIAGNOSTIC_LOG_NAME: &str = "tool_lending_tracker.log";
/// Fallback folder beneath the home directory when the executable's own
/// directory cannot be resolved.
const FALLBACK_DIR_NAME: &str = ".tool-lending-tracker";

/// Snapshot backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: Locale,
    pub storage: StorageBackend,
    /// Grace period before a selector that lost focus decides whether to close.
    pub focus_grace_ms: u64,
    pub log_level: String,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::English,
            storage: StorageBackend::Sqlite,
            focus_grace_ms: 200,
            log_level: "info".to_string(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Load `tool_lending.toml` from the application directory.
    pub fn load() -> Result<Self> {
        let app_dir = application_dir()?;
        let mut config = Self::load_from(&app_dir.join(CONFIG_FILE_NAME))?;
        config.data_dir = Some(resolve_data_dir(&app_dir, config.data_dir.as_deref()));
        Ok(config)
    }

    /// Parse a config file, treating a missing file as all-defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("failed to parse configuration")
    }

    pub fn focus_grace(&self) -> Duration {
        Duration::from_millis(self.focus_grace_ms)
    }

    /// Directory holding the snapshot and log files. Relative paths are taken
    /// from the application directory, where the config file itself lives.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) if dir.is_absolute() => Ok(dir.clone()),
            configured => Ok(resolve_data_dir(&application_dir()?, configured.as_deref())),
        }
    }
}

fn resolve_data_dir(app_dir: &Path, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(dir) => app_dir.join(dir),
        None => app_dir.to_path_buf(),
    }
}

/// Directory of the running executable, or a dot-folder in the user's home
/// when that cannot be determined.
pub fn application_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        return Ok(dir);
    }
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(FALLBACK_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.focus_grace(), Duration::from_millis(200));
    }

    #[test]
    fn parses_every_key() {
        let config = Config::parse(
            r#"
            locale = "pl"
            storage = "json"
            focus_grace_ms = 350
            log_level = "debug"
            data_dir = "/tmp/lending"
            "#,
        )
        .unwrap();
        assert_eq!(config.locale, Locale::Polish);
        assert_eq!(config.storage, StorageBackend::Json);
        assert_eq!(config.focus_grace_ms, 350);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/lending")));
    }

    #[test]
    fn rejects_unknown_locale() {
        assert!(Config::parse(r#"locale = "de""#).is_err());
    }

    #[test]
    fn relative_data_dir_sits_beside_the_executable() {
        let app_dir = Path::new("/opt/lending");
        assert_eq!(
            resolve_data_dir(app_dir, Some(Path::new("data"))),
            PathBuf::from("/opt/lending/data")
        );
        assert_eq!(
            resolve_data_dir(app_dir, Some(Path::new("/srv/lending"))),
            PathBuf::from("/srv/lending")
        );
        assert_eq!(resolve_data_dir(app_dir, None), PathBuf::from("/opt/lending"));

        let config = Config {
            data_dir: Some(PathBuf::from("data")),
            ..Config::default()
        };
        let resolved = config.data_dir().unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("data"));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, Config::default());
    }
}
