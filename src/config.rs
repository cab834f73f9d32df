//! Configuration file handling for findash.
//!
//! The configuration file is stored at `$FINDASH_HOME/config.json`. It holds the URL of the
//! Google sheet to read and the limits applied when loading. The file is optional: when it does
//! not exist, built-in defaults are used.

use crate::api::export_url;
use crate::loader::{Limits, MAX_FILE_BYTES, MAX_ROWS};
use crate::{utils, Result};
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "findash";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// The public sample sheet that is read when no other sheet has been configured.
pub const DEFAULT_SHEET_URL: &str =
    "https://docs.google.com/spreadsheets/d/1k6DNSgJ5XHw1D7rM7JTkv_d8TmqVstgwTwj8qETBKsU/export?format=csv";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINDASH_HOME` and from there it loads `$FINDASH_HOME/config.json`, if it exists.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and writes an initial `config.json` that uses `sheet_url`.
    ///
    /// # Errors
    /// - Returns an error if `sheet_url` is not a usable sheet URL.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, sheet_url: &str) -> Result<Self> {
        let _ = export_url(sheet_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the findash home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            sheet_url: sheet_url.trim().to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// Loads `$FINDASH_HOME/config.json`. If the home directory or the file does not exist, the
    /// defaults are returned instead.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or is invalid.
    pub async fn load(findash_home: impl Into<PathBuf>) -> Result<Self> {
        let root = findash_home.into();
        let config_path = root.join(CONFIG_JSON);
        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path).await?
        } else {
            debug!(
                "No config file at '{}', using defaults",
                config_path.display()
            );
            ConfigFile::default()
        };
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sheet_url(&self) -> &str {
        &self.config_file.sheet_url
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_file_bytes: self.config_file.max_file_bytes,
            max_rows: self.config_file.max_rows,
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "findash",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
///   "max_file_bytes": 10485760,
///   "max_rows": 10000
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "findash"
    app_name: String,

    config_version: u8,

    /// The sheet read by the `--sheet` and `--fallback` sources
    sheet_url: String,

    #[serde(default = "default_max_file_bytes")]
    max_file_bytes: u64,

    #[serde(default = "default_max_rows")]
    max_rows: usize,
}

fn default_max_file_bytes() -> u64 {
    MAX_FILE_BYTES
}

fn default_max_rows() -> usize {
    MAX_ROWS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: DEFAULT_SHEET_URL.to_string(),
            max_file_bytes: MAX_FILE_BYTES,
            max_rows: MAX_ROWS,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if its values are invalid.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.max_rows > 0 && config.max_file_bytes > 0,
            "Invalid limits in config file '{}': max_rows and max_file_bytes must be positive",
            path.display()
        );
        Ok(config)
    }

    /// # Errors
    /// Returns an error if the file cannot be written.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("findash_home");
        let sheet_url = "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";

        let created = Config::create(&home, sheet_url).await.unwrap();
        assert_eq!(created.sheet_url(), sheet_url);
        assert!(created.config_path().is_file());

        let loaded = Config::load(created.root()).await.unwrap();
        assert_eq!(loaded.sheet_url(), sheet_url);
        assert_eq!(loaded.limits(), Limits::default());
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let result = Config::create(dir.path(), "https://docs.google.com/document/x").await;
        assert!(result.is_err());
        assert!(!dir.path().join(CONFIG_JSON).exists());
    }

    #[tokio::test]
    async fn test_config_load_missing_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path().join("nowhere")).await.unwrap();
        assert_eq!(config.sheet_url(), DEFAULT_SHEET_URL);
        assert_eq!(config.limits().max_rows, MAX_ROWS);
    }

    #[tokio::test]
    async fn test_config_file_minimal_uses_default_limits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "findash",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/minimal"
        }"#;
        utils::write(&path, json).await.unwrap();

        let config = ConfigFile::load(&path).await.unwrap();
        assert_eq!(config.sheet_url, "https://docs.google.com/spreadsheets/d/minimal");
        assert_eq!(config.max_file_bytes, MAX_FILE_BYTES);
        assert_eq!(config.max_rows, MAX_ROWS);
    }

    #[tokio::test]
    async fn test_config_file_custom_limits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "findash",
            "config_version": 1,
            "sheet_url": "https://example.com/data.csv",
            "max_file_bytes": 2048,
            "max_rows": 50
        }"#;
        utils::write(&path, json).await.unwrap();

        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(
            config.limits(),
            Limits {
                max_file_bytes: 2048,
                max_rows: 50
            }
        );
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/test"
        }"#;
        utils::write(&path, json).await.unwrap();

        let result = ConfigFile::load(&path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_zero_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "findash",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/test",
            "max_rows": 0
        }"#;
        utils::write(&path, json).await.unwrap();
        assert!(ConfigFile::load(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.json");
        let original = ConfigFile {
            sheet_url: String::from("https://docs.google.com/spreadsheets/d/test123"),
            max_rows: 7,
            ..ConfigFile::default()
        };
        original.save(&path).await.unwrap();
        assert_eq!(ConfigFile::load(&path).await.unwrap(), original);
    }
}
