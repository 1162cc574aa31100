//! Configuration file handling for the CLI.
//!
//! Settings and the admin session live in `config.toml` under the platform
//! config directory (`$XDG_CONFIG_HOME/verifymc/config.toml` on Linux). The
//! `[session]` table backs the business layer's [`Storage`] trait, so the
//! session survives between invocations.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use verifymc_business::{BusinessConfig, Storage, StorageError};

/// CLI configuration stored on disk
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    /// Session keys written by the business layer
    #[serde(default)]
    pub session: BTreeMap<String, String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSection {
    /// Portal origin; empty or missing means `http://localhost:8080`
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub locale: Option<String>,
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

impl Config {
    /// `$XDG_CONFIG_HOME/verifymc/config.toml` on Linux, the platform
    /// equivalent elsewhere.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "verifymc", "verifymc")
            .context("Failed to determine config directory")?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write to `path`, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| StorageError::Serialize(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Business settings, with `api_url` and `locale` taking precedence over
    /// the file.
    pub fn business_config(&self, api_url: Option<&str>, locale: Option<&str>) -> BusinessConfig {
        let base_url = api_url
            .or(self.api.base_url.as_deref())
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL);

        let mut config = BusinessConfig::new(base_url.to_owned());
        if let Some(secs) = self.api.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(locale) = locale.or(self.api.locale.as_deref()) {
            config = config.with_locale(locale);
        }
        config
    }
}

/// [`Storage`] backed by the `[session]` table of a config file. Every write
/// is flushed to disk immediately.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    config: Mutex<Config>,
}

impl FileStorage {
    pub fn open(path: PathBuf) -> Result<Self> {
        let config = Config::load_from(&path)?;
        Ok(Self {
            path,
            config: Mutex::new(config),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current file contents.
    pub fn config(&self) -> Config {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Config> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StorageError> {
        let mut config = self.lock();
        f(&mut config.session);
        config.save_to(&self.path)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().session.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.modify(|session| {
            session.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.modify(|session| {
            session.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.api.base_url.is_none());
        assert!(config.session.is_empty());
    }

    #[test]
    fn test_business_config_precedence() {
        let config = Config {
            api: ApiSection {
                base_url: Some("https://file.example.com".to_owned()),
                timeout_secs: Some(3),
                locale: Some("en".to_owned()),
            },
            ..Config::default()
        };

        let business = config.business_config(None, None);
        assert_eq!(business.api_base_url, "https://file.example.com");
        assert_eq!(business.request_timeout, Duration::from_secs(3));
        assert_eq!(business.locale, "en");

        let business = config.business_config(Some("https://flag.example.com"), Some("zh"));
        assert_eq!(business.api_base_url, "https://flag.example.com");
        assert_eq!(business.locale, "zh");

        let business = Config::default().business_config(Some("  "), None);
        assert_eq!(business.api_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_file_storage_persists_session() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let storage = FileStorage::open(path.clone()).expect("Should open missing file");
        storage.set("admin_token", "abc").expect("Should write");
        storage.set("is_admin", "true").expect("Should write");
        storage.remove("is_admin").expect("Should remove");

        let reopened = FileStorage::open(path).expect("Should reopen");
        assert_eq!(reopened.get("admin_token").as_deref(), Some("abc"));
        assert_eq!(reopened.get("is_admin"), None);
    }

    #[test]
    fn test_api_section_survives_session_writes() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\nbase_url = \"https://mc.example.com\"\n")
            .expect("Should seed file");

        let storage = FileStorage::open(path.clone()).expect("Should open");
        storage.set("admin_token", "abc").expect("Should write");

        let config = Config::load_from(&path).expect("Should parse");
        assert_eq!(config.api.base_url.as_deref(), Some("https://mc.example.com"));
        assert_eq!(config.session.get("admin_token").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = [valid").expect("Should seed file");

        assert!(Config::load_from(&path).is_err());
    }
}
