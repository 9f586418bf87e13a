// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Layered: built-in defaults, then `config.toml`, then `AVPLANNER_*`
//! environment variables.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::schedule::StaticSchedule;
use crate::storage::{DriveClient, LocalStore, DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE};

/// Environment prefix for overrides
pub const ENV_PREFIX: &str = "AVPLANNER";

/// Keys accepted by `config get/set`
pub const KEYS: &[&str] = &[
    "data_dir",
    "log_level",
    "team_folder_id",
    "schedule_path",
    "catalog_path",
    "drive_api_base",
    "drive_upload_base",
    "access_token",
];

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "avplanner", "av-planner")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/av-planner"))
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the working project and the local project store
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Fixed team folder: new cloud files go here and searches are scoped to it
    #[serde(default)]
    pub team_folder_id: Option<String>,
    /// JSON bookings file replacing the built-in schedule
    #[serde(default)]
    pub schedule_path: Option<PathBuf>,
    /// JSON catalog replacing the built-in one
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Cloud metadata API root
    pub drive_api_base: String,
    /// Cloud upload API root
    pub drive_upload_base: String,
    /// Bearer token for cloud storage; cloud features are off without it
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
            team_folder_id: None,
            schedule_path: None,
            catalog_path: None,
            drive_api_base: DEFAULT_API_BASE.to_string(),
            drive_upload_base: DEFAULT_UPLOAD_BASE.to_string(),
            access_token: None,
        }
    }
}

impl Config {
    /// Team folder, if set and non-empty
    #[must_use]
    pub fn team_folder(&self) -> Option<&str> {
        self.team_folder_id.as_deref().filter(|f| !f.is_empty())
    }

    /// Catalog from `catalog_path`, or the built-in one
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Ok(Catalog::builtin()),
        }
    }

    /// Schedule from `schedule_path`, or the built-in demo schedule
    pub fn schedule(&self) -> Result<StaticSchedule> {
        match &self.schedule_path {
            Some(path) => StaticSchedule::load(path),
            None => Ok(StaticSchedule::mock()),
        }
    }

    /// Local project store under the data directory
    #[must_use]
    pub fn local_store(&self) -> LocalStore {
        LocalStore::new(self.data_dir.join("projects"))
    }

    /// Cloud client when a token is configured
    #[must_use]
    pub fn cloud(&self) -> Option<DriveClient> {
        self.access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|token| DriveClient::with_endpoints(token, &self.drive_api_base, &self.drive_upload_base))
    }
}

/// Config file location: explicit path, `AVPLANNER_CONFIG`, or the platform
/// config directory
#[must_use]
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(format!("{ENV_PREFIX}_CONFIG")) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration from all layers
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let defaults = Config::default();
    let mut builder = ::config::Config::builder()
        .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
        .set_default("log_level", defaults.log_level)?
        .set_default("drive_api_base", defaults.drive_api_base)?
        .set_default("drive_upload_base", defaults.drive_upload_base)?;

    if let Some(path) = config_path(explicit) {
        builder = builder.add_source(
            ::config::File::from(path)
                .format(::config::FileFormat::Toml)
                .required(false),
        );
    }

    builder
        .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(false))
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")
}

fn check_key(key: &str) -> Result<()> {
    if !KEYS.contains(&key) {
        bail!("Unknown config key: {key} (expected one of {})", KEYS.join(", "));
    }
    Ok(())
}

fn read_table(path: &Path) -> Result<toml::Table> {
    if !path.exists() {
        return Ok(toml::Table::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    content
        .parse()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Value of a key in the config file, if set there
pub fn get_value(path: &Path, key: &str) -> Result<Option<String>> {
    check_key(key)?;
    Ok(read_table(path)?.get(key).map(|v| match v {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }))
}

/// Set a key in the config file, creating it if needed
pub fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
    check_key(key)?;
    let mut table = read_table(path)?;
    table.insert(key.to_string(), toml::Value::String(value.to_string()));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(&table)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_layer_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "team_folder_id = \"team-7\"\nlog_level = \"debug\"\n").unwrap();

        let config = load(Some(&path)).unwrap();

        assert_eq!(config.team_folder(), Some("team-7"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.drive_api_base, DEFAULT_API_BASE);
        assert!(config.cloud().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        set_value(&path, "schedule_path", "/srv/bookings.json").unwrap();

        assert_eq!(get_value(&path, "schedule_path").unwrap().as_deref(), Some("/srv/bookings.json"));
        assert_eq!(get_value(&path, "team_folder_id").unwrap(), None);
        assert!(set_value(&path, "bogus", "x").is_err());
    }

    #[test]
    fn test_empty_team_folder_is_unset() {
        let config = Config {
            team_folder_id: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(config.team_folder(), None);
    }
}
