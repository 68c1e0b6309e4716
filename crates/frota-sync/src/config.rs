// File: frota-sync/src/config.rs
// Purpose: Configuration parsing from frota.toml and the environment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the remote endpoint URL
pub const ENV_REMOTE_URL: &str = "SUPABASE_URL";

/// Environment variable holding the remote access key
pub const ENV_REMOTE_KEY: &str = "SUPABASE_ANON_KEY";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FleetConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote table store section. Both endpoint and key must be set for the
/// remote adapter to be active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub access_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Local snapshot section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding snapshot files
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    /// Snapshot key (file stem)
    #[serde(default = "default_storage_key")]
    pub key: String,
}

/// Resolved settings for an active remote adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub endpoint: String,
    pub access_key: String,
    pub timeout: Duration,
}

// Default values
fn default_timeout_secs() -> u64 {
    10
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".frota")
}

fn default_storage_key() -> String {
    "empresa_carros_data_v1".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            key: default_storage_key(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl FleetConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: FleetConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./frota.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("frota.toml")
    }

    /// Apply `SUPABASE_URL` / `SUPABASE_ANON_KEY` from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_REMOTE_URL) {
            self.remote.endpoint = Some(url);
        }
        if let Some(key) = lookup(ENV_REMOTE_KEY) {
            self.remote.access_key = Some(key);
        }
        self
    }

    /// Settings for the remote adapter, or `None` when either value is missing
    pub fn remote_settings(&self) -> Option<RemoteSettings> {
        let endpoint = non_blank(&self.remote.endpoint)?;
        let access_key = non_blank(&self.remote.access_key)?;

        Some(RemoteSettings {
            endpoint,
            access_key,
            timeout: Duration::from_secs(self.remote.timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = FleetConfig::default();
        assert_eq!(config.storage.dir, PathBuf::from(".frota"));
        assert_eq!(config.storage.key, "empresa_carros_data_v1");
        assert_eq!(config.remote.timeout_secs, 10);
        assert!(config.remote_settings().is_none());
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<FleetConfig>("").unwrap_or_default();
        assert!(config.remote_settings().is_none());
        assert_eq!(config.storage.key, "empresa_carros_data_v1");
    }

    #[test]
    fn test_remote_section() {
        let toml = r#"
            [remote]
            endpoint = "https://fleet.supabase.co"
            access_key = "anon"
            timeout_secs = 3

            [storage]
            dir = "/tmp/frota"
        "#;
        let config: FleetConfig = toml::from_str(toml).unwrap();
        let settings = config.remote_settings().unwrap();

        assert_eq!(settings.endpoint, "https://fleet.supabase.co");
        assert_eq!(settings.access_key, "anon");
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/frota"));
    }

    #[test]
    fn test_remote_requires_both_values() {
        let toml = r#"
            [remote]
            endpoint = "https://fleet.supabase.co"
            access_key = "   "
        "#;
        let config: FleetConfig = toml::from_str(toml).unwrap();
        assert!(config.remote_settings().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_REMOTE_URL, "https://env.supabase.co"),
            (ENV_REMOTE_KEY, "env-key"),
        ]
        .into_iter()
        .collect();

        let config = FleetConfig::default()
            .with_overrides_from(|name| env.get(name).map(|v| v.to_string()));

        let settings = config.remote_settings().unwrap();
        assert_eq!(settings.endpoint, "https://env.supabase.co");
        assert_eq!(settings.access_key, "env-key");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = FleetConfig::load("/definitely/not/here/frota.toml").unwrap();
        assert!(config.remote_settings().is_none());
    }
}
