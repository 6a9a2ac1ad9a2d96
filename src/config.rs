//! TOML configuration for the `desk` client.
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! timeout_secs = 30
//!
//! [session]
//! token_path = "~/.config/support-desk/session.json"   # optional
//!
//! [ui]
//! notifications = "auto"   # auto | human | json | off
//! ```
//!
//! `DESK_API_URL` in the environment overrides `api.base_url`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "DESK_API_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    /// Where the bearer token is persisted. Defaults to
    /// `<config dir>/support-desk/session.json`.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

impl SessionConfig {
    pub fn resolved_token_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.token_path {
            return Ok(path.clone());
        }
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("cannot determine a config directory; set session.token_path"))?;
        Ok(base.join("support-desk").join("session.json"))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    #[serde(default = "default_notifications")]
    pub notifications: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notifications: default_notifications(),
        }
    }
}

fn default_notifications() -> String {
    "auto".to_string()
}

impl Config {
    /// Built-in defaults used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            api: ApiConfig {
                base_url: default_base_url(),
                timeout_secs: default_timeout_secs(),
            },
            session: SessionConfig::default(),
            ui: UiConfig::default(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
/// Environment overrides apply either way.
pub fn load_or_default(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        load_config(path)?
    } else {
        Config::minimal()
    };
    override_base_url(config, std::env::var(API_URL_ENV).ok())
}

/// Replace `api.base_url` with a non-blank `api_url` and re-validate.
///
/// Used for both `DESK_API_URL` and the `--api-url` flag.
pub fn override_base_url(mut config: Config, api_url: Option<String>) -> Result<Config> {
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        config.api.base_url = url;
        return validate(config);
    }
    Ok(config)
}

fn validate(config: Config) -> Result<Config> {
    let url = config.api.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!(
            "api.base_url must start with http:// or https:// (got '{}')",
            config.api.base_url
        );
    }

    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }

    match config.ui.notifications.as_str() {
        "auto" | "human" | "json" | "off" => {}
        other => anyhow::bail!(
            "Unknown ui.notifications mode: '{}'. Must be auto, human, json, or off.",
            other
        ),
    }

    Ok(config)
}
