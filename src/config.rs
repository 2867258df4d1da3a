//! Configuration handling.
//!
//! Configuration is stored in `.campus/config.yaml` and includes:
//! - The hosted table service endpoint and key
//! - The identity provider web API key
//!
//! Environment variables take precedence over the file.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{CampusError, Result};
use crate::types::CAMPUS_DIR;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// Hosted table service settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Identity provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(CAMPUS_DIR).join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Table service base URL from environment or config
    pub fn store_url(&self) -> Option<String> {
        env_non_empty("CAMPUS_STORE_URL").or_else(|| self.store.url.clone())
    }

    /// Table service key from environment or config
    pub fn store_api_key(&self) -> Option<SecretString> {
        env_non_empty("CAMPUS_STORE_KEY")
            .or_else(|| self.store.api_key.clone())
            .map(SecretString::from)
    }

    /// Identity provider web API key from environment or config
    pub fn auth_api_key(&self) -> Option<SecretString> {
        env_non_empty("CAMPUS_AUTH_API_KEY")
            .or_else(|| self.auth.api_key.clone())
            .map(SecretString::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Store URL and key, or a configuration error naming what is missing
    pub fn require_store(&self) -> Result<(String, SecretString)> {
        let url = self.store_url().ok_or_else(|| {
            CampusError::Config(
                "store.url not configured (set it with `campus config set store.url <url>`)"
                    .to_string(),
            )
        })?;
        let key = self.store_api_key().ok_or_else(|| {
            CampusError::Config(
                "store.api_key not configured (or set CAMPUS_STORE_KEY)".to_string(),
            )
        })?;
        Ok((url, key))
    }

    pub fn require_auth_api_key(&self) -> Result<SecretString> {
        self.auth_api_key().ok_or_else(|| {
            CampusError::Config(
                "auth.api_key not configured (or set CAMPUS_AUTH_API_KEY)".to_string(),
            )
        })
    }

    /// Apply a dotted `key = value` assignment
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "store.url" => {
                url::Url::parse(value)?;
                self.store.url = Some(value.to_string());
            }
            "store.api_key" => self.store.api_key = Some(value.to_string()),
            "store.timeout_secs" => {
                let secs: u64 = value.parse().map_err(|_| {
                    CampusError::Config(format!("invalid timeout '{value}', expected seconds"))
                })?;
                self.store.timeout_secs = Some(secs);
            }
            "auth.api_key" => self.auth.api_key = Some(value.to_string()),
            _ => {
                return Err(CampusError::Config(format!(
                    "unknown config key '{key}'. Valid keys: store.url, store.api_key, \
                     store.timeout_secs, auth.api_key"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.store.url.is_none());
        assert!(config.auth.api_key.is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_set_value_known_keys() {
        let mut config = Config::default();
        config
            .set_value("store.url", "https://db.example.com")
            .unwrap();
        config.set_value("store.timeout_secs", "5").unwrap();
        config.set_value("auth.api_key", "AIza-test").unwrap();

        assert_eq!(config.store.url.as_deref(), Some("https://db.example.com"));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.auth.api_key.as_deref(), Some("AIza-test"));
    }

    #[test]
    fn test_set_value_rejects_unknown_key_and_bad_values() {
        let mut config = Config::default();
        assert!(config.set_value("store.password", "x").is_err());
        assert!(config.set_value("store.url", "not a url").is_err());
        assert!(config.set_value("store.timeout_secs", "soon").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.set_value("store.url", "https://db.example.com").unwrap();
        config.set_value("store.api_key", "anon-key").unwrap();

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: Config = serde_yaml_ng::from_str(&yaml).unwrap();

        assert_eq!(parsed.store.url.as_deref(), Some("https://db.example.com"));
        assert_eq!(parsed.store.api_key.as_deref(), Some("anon-key"));
        assert!(!yaml.contains("auth:\n  api_key"));
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file_values() {
        let mut config = Config::default();
        config.set_value("store.url", "https://file.example.com").unwrap();
        config.set_value("store.api_key", "file-key").unwrap();

        unsafe {
            std::env::set_var("CAMPUS_STORE_URL", "https://env.example.com");
            std::env::set_var("CAMPUS_STORE_KEY", "env-key");
        }
        let (url, key) = config.require_store().unwrap();
        assert_eq!(url, "https://env.example.com");
        assert_eq!(key.expose_secret(), "env-key");

        unsafe {
            std::env::set_var("CAMPUS_STORE_URL", "");
            std::env::remove_var("CAMPUS_STORE_KEY");
        }
        let (url, key) = config.require_store().unwrap();
        assert_eq!(url, "https://file.example.com", "empty variables are ignored");
        assert_eq!(key.expose_secret(), "file-key");

        unsafe { std::env::remove_var("CAMPUS_STORE_URL") };
    }

    #[test]
    #[serial]
    fn test_require_store_names_missing_setting() {
        unsafe {
            std::env::remove_var("CAMPUS_STORE_URL");
            std::env::remove_var("CAMPUS_STORE_KEY");
        }
        let err = Config::default().require_store().unwrap_err();
        assert!(err.to_string().contains("store.url not configured"));
    }
}
