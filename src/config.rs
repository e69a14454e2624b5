//! Application configuration management.
//!
//! Two sources of configuration exist: the environment (`DIVIMATE_API_URL`
//! and `DIVIMATE_ENV`, optionally via a `.env` file) decides which backend
//! to talk to, and `~/.config/divimate/config.json` remembers small UX
//! preferences like the last email used to sign in.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "divimate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when no API URL is configured (local development)
const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Environment variable naming the backend base URL
const API_URL_VAR: &str = "DIVIMATE_API_URL";

/// Environment variable naming the deployment environment
const ENV_VAR: &str = "DIVIMATE_ENV";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session token.
    pub fn data_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME))
    }
}

/// Resolve the backend base URL from the environment.
///
/// Production deployments must name their backend explicitly; falling
/// back to localhost there would fail in a confusing way much later, so
/// it is refused at startup instead.
pub fn resolve_api_url() -> Result<String> {
    select_api_url(
        std::env::var(API_URL_VAR).ok().as_deref(),
        std::env::var(ENV_VAR).ok().as_deref(),
    )
}

fn select_api_url(api_url: Option<&str>, environment: Option<&str>) -> Result<String> {
    match api_url {
        Some(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        _ => {
            if environment == Some("production") {
                anyhow::bail!(
                    "{} is required when {}=production; refusing to fall back to {}",
                    API_URL_VAR,
                    ENV_VAR,
                    DEFAULT_API_URL
                );
            }
            tracing::warn!("{} not set, using {}", API_URL_VAR, DEFAULT_API_URL);
            Ok(DEFAULT_API_URL.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_url_wins() {
        let url = select_api_url(Some("https://api.divimate.app"), Some("production"))
            .expect("explicit URL should resolve");
        assert_eq!(url, "https://api.divimate.app");
    }

    #[test]
    fn test_missing_url_falls_back_to_localhost() {
        let url = select_api_url(None, None).expect("fallback should resolve");
        assert_eq!(url, DEFAULT_API_URL);
    }

    #[test]
    fn test_blank_url_counts_as_missing() {
        let url = select_api_url(Some("   "), Some("development")).expect("fallback");
        assert_eq!(url, DEFAULT_API_URL);
    }

    #[test]
    fn test_production_without_url_is_refused() {
        let err = select_api_url(None, Some("production")).expect_err("should refuse");
        assert!(err.to_string().contains("DIVIMATE_API_URL"));
    }
}
