//! Credential and settings persistence
//!
//! One JSON file under the app data directory holds the user's OpenAI API
//! key and the download preference. Both key-entry surfaces in the
//! front-end write through [`store_api_key`] and re-read through the same
//! file, so the stored value is the single source of truth.

use crate::paths::get_config_path;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    #[serde(default = "default_auto_download")]
    pub auto_download: bool,
}

fn default_auto_download() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            auto_download: default_auto_download(),
        }
    }
}

impl AppConfig {
    /// Returns the stored credential when one is present and non-empty
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref().filter(|k| !k.is_empty())
    }
}

pub fn read_config(path: &Path) -> Result<AppConfig, String> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config: {}", e))?;
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
    } else {
        Ok(AppConfig::default())
    }
}

pub fn write_config(path: &Path, config: &AppConfig) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory: {}", e))?;
    }
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to save config: {}", e))
}

/// Loads the config from its default location
pub fn load_config() -> Result<AppConfig, String> {
    read_config(&get_config_path()?)
}

/// Saves the config to its default location
pub fn save_config(config: &AppConfig) -> Result<(), String> {
    write_config(&get_config_path()?, config)
}

/// Stores a new API key after trimming. Empty candidates are ignored.
///
/// Returns whether a key was stored, so callers know if the mirrored
/// entry surfaces need a refresh.
pub fn store_api_key(path: &Path, candidate: &str) -> Result<bool, String> {
    let key = candidate.trim();
    if key.is_empty() {
        return Ok(false);
    }
    let mut config = read_config(path)?;
    config.openai_api_key = Some(key.to_string());
    write_config(path, &config)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
        dir.path().join(".config.json")
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = read_config(&config_path(&dir)).unwrap();
        assert!(config.openai_api_key.is_none());
        assert!(config.auto_download);
    }

    #[test]
    fn test_store_trims_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_path(&dir);
        assert!(store_api_key(&path, "  sk-test-123  ").unwrap());
        let config = read_config(&path).unwrap();
        assert_eq!(config.api_key(), Some("sk-test-123"));
    }

    #[test]
    fn test_store_ignores_empty_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_path(&dir);
        assert!(!store_api_key(&path, "   ").unwrap());
        assert!(!path.exists());
        assert!(read_config(&path).unwrap().openai_api_key.is_none());
    }

    #[test]
    fn test_store_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_path(&dir);
        assert!(store_api_key(&path, "sk-test-123").unwrap());
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(store_api_key(&path, "sk-test-123").unwrap());
        let second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_store_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_path(&dir);
        write_config(
            &path,
            &AppConfig {
                openai_api_key: None,
                auto_download: false,
            },
        )
        .unwrap();
        store_api_key(&path, "sk-test-123").unwrap();
        let config = read_config(&path).unwrap();
        assert!(!config.auto_download);
        assert_eq!(config.api_key(), Some("sk-test-123"));
    }

    #[test]
    fn test_empty_stored_key_counts_as_absent() {
        let config = AppConfig {
            openai_api_key: Some(String::new()),
            auto_download: true,
        };
        assert!(config.api_key().is_none());
    }
}
