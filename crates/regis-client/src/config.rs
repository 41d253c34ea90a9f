use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Client configuration: which backend origin and photo bucket to talk to.
///
/// Loaded from `<config_dir>/regis/config.toml`; a missing file means
/// defaults. `REGIS_API_URL` / `REGIS_STORAGE_URL` override either field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_storage_url")]
    pub storage_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            storage_url: default_storage_url(),
        }
    }
}

impl ClientConfig {
    /// Load from the user config dir, then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.toml"))?,
            None => Self::default(),
        };

        if let Ok(url) = std::env::var("REGIS_API_URL") {
            config.api_url = url;
        }
        if let Ok(url) = std::env::var("REGIS_STORAGE_URL") {
            config.storage_url = url;
        }
        Ok(config)
    }

    /// Load from an explicit path; missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// `<platform config dir>/regis`, shared by config and the token file.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("regis"))
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_storage_url() -> String {
    "http://localhost:9000/student-photos".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = ClientConfig::load_from(&dir.path().join("config.toml")).expect("load");
        assert_eq!(cfg.api_url, "http://localhost:5000");
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"https://sis.example.edu\"\n").expect("write");

        let cfg = ClientConfig::load_from(&path).expect("load");
        assert_eq!(cfg.api_url, "https://sis.example.edu");
        assert_eq!(cfg.storage_url, "http://localhost:9000/student-photos");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = [not toml").expect("write");
        assert!(ClientConfig::load_from(&path).is_err());
    }
}
