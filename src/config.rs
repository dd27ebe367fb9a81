//! Configuration Management
//!
//! Credentials and droplet defaults, stored as JSON in the user config dir
//! and overridable from the environment.

use crate::api::{Account, ApiHttpClient, Credentials, API_ROOT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_CLIENT_ID: &str = "DIGITAL_OCEAN_CLIENT_ID";
pub const ENV_API_KEY: &str = "DIGITAL_OCEAN_API_KEY";
pub const ENV_API_ROOT: &str = "DIGO_API_ROOT";

/// Values set explicitly by `digo configure`
#[derive(Clone, Default)]
pub struct ConfigUpdate {
    pub client_id: Option<String>,
    pub api_key: Option<String>,
    pub region_id: Option<u64>,
    pub size_id: Option<u64>,
    pub image_id: Option<u64>,
    pub ssh_key_id: Option<u64>,
}

/// User configuration
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Default region for new droplets
    #[serde(default)]
    pub region_id: Option<u64>,
    /// Default size for new droplets
    #[serde(default)]
    pub size_id: Option<u64>,
    /// Default image for new droplets
    #[serde(default)]
    pub image_id: Option<u64>,
    /// Default SSH key for new droplets
    #[serde(default)]
    pub ssh_key_id: Option<u64>,
    #[serde(default)]
    pub api_root: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("digo").join("config.json"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Self {
        Self::load_file().with_overrides(|name| std::env::var(name).ok())
    }

    /// Load configuration from disk only
    pub fn load_file() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Error ensuring path {:?} exists", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("Error writing {:?}", path))?;

        Ok(())
    }

    /// Apply explicitly given values, keeping the rest
    pub fn updated(mut self, update: ConfigUpdate) -> Self {
        self.client_id = update.client_id.or(self.client_id);
        self.api_key = update.api_key.or(self.api_key);
        self.region_id = update.region_id.or(self.region_id);
        self.size_id = update.size_id.or(self.size_id);
        self.image_id = update.image_id.or(self.image_id);
        self.ssh_key_id = update.ssh_key_id.or(self.ssh_key_id);
        self
    }

    /// Replace values with those found through `lookup` (env > file)
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(client_id) = non_empty(ENV_CLIENT_ID) {
            self.client_id = Some(client_id);
        }
        if let Some(api_key) = non_empty(ENV_API_KEY) {
            self.api_key = Some(api_key);
        }
        if let Some(api_root) = non_empty(ENV_API_ROOT) {
            self.api_root = Some(api_root);
        }
        self
    }

    /// Get effective API root (env/config > default)
    pub fn effective_api_root(&self) -> String {
        self.api_root
            .clone()
            .unwrap_or_else(|| API_ROOT.to_string())
    }

    /// Build the account for this invocation
    pub fn account(&self) -> Result<Account> {
        let (Some(client_id), Some(api_key)) = (&self.client_id, &self.api_key) else {
            anyhow::bail!(
                "No credentials configured. Set {} and {} or run 'digo configure'",
                ENV_CLIENT_ID,
                ENV_API_KEY
            );
        };

        let http = ApiHttpClient::with_api_root(self.effective_api_root())
            .context("Failed to create HTTP client")?;

        let mut account = Account::with_http(Credentials::new(client_id, api_key), http);
        account.region_id = self.region_id;
        account.size_id = self.size_id;
        account.image_id = self.image_id;
        account.ssh_key_id = self.ssh_key_id;
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let config = Config {
            client_id: Some("file-id".to_string()),
            api_key: Some("file-key".to_string()),
            ..Default::default()
        }
        .with_overrides(env(&[(ENV_API_KEY, "env-key"), (ENV_CLIENT_ID, "")]));

        assert_eq!(config.client_id.as_deref(), Some("file-id"));
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn test_update_applies_only_given_values() {
        let file = Config {
            client_id: Some("file-id".to_string()),
            api_key: Some("file-key".to_string()),
            region_id: Some(1),
            size_id: Some(66),
            ..Default::default()
        };
        let config = file.updated(ConfigUpdate {
            api_key: Some("flag-key".to_string()),
            region_id: Some(3),
            ..Default::default()
        });

        assert_eq!(config.client_id.as_deref(), Some("file-id"));
        assert_eq!(config.api_key.as_deref(), Some("flag-key"));
        assert_eq!(config.region_id, Some(3));
        assert_eq!(config.size_id, Some(66));
        assert!(config.api_root.is_none());
    }

    #[test]
    fn test_saved_json_excludes_environment_values() {
        let file = Config {
            client_id: Some("file-id".to_string()),
            ..Default::default()
        };
        let saved = file.clone().updated(ConfigUpdate::default());
        let with_env = file.with_overrides(env(&[
            (ENV_API_KEY, "env-key"),
            (ENV_API_ROOT, "http://localhost:1"),
        ]));

        let json = serde_json::to_string(&saved).unwrap();
        assert!(!json.contains("env-key"));
        assert!(!json.contains("localhost"));
        assert_eq!(with_env.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn test_missing_credentials_is_an_error() {
        let config = Config {
            client_id: Some("id".to_string()),
            ..Default::default()
        };
        let err = config.account().unwrap_err();
        assert!(err.to_string().contains(ENV_API_KEY));
    }

    #[test]
    fn test_account_carries_defaults() {
        let config = Config {
            client_id: Some("id".to_string()),
            api_key: Some("key".to_string()),
            region_id: Some(1),
            image_id: Some(420),
            api_root: Some("http://localhost:9999/".to_string()),
            ..Default::default()
        };
        let account = config.account().unwrap();
        assert_eq!(account.client_id(), "id");
        assert_eq!(account.region_id, Some(1));
        assert_eq!(account.image_id, Some(420));
        assert_eq!(account.http().api_root(), "http://localhost:9999");
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config: Config = serde_json::from_str(r#"{"client_id":"a","size_id":66}"#).unwrap();
        assert_eq!(config.client_id.as_deref(), Some("a"));
        assert_eq!(config.size_id, Some(66));
        assert!(config.api_key.is_none());
        assert_eq!(config.effective_api_root(), API_ROOT);
    }
}
