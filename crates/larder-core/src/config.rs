use crate::expiry::{DEFAULT_INDEFINITE_MARKER, ExpiryParser, ShelfLifeUnit};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Full larder configuration, loaded from TOML.
///
/// Every section is optional; a missing file yields pure defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LarderConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub expiry: ExpiryConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub push: PushConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    /// Explicit store path; falls back to the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpiryConfig {
    #[serde(default = "default_indefinite_marker")]
    pub indefinite_marker: String,
    #[serde(default)]
    pub unit: ShelfLifeUnit,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            indefinite_marker: default_indefinite_marker(),
            unit: ShelfLifeUnit::default(),
        }
    }
}

impl ExpiryConfig {
    #[must_use]
    pub fn parser(&self) -> ExpiryParser {
        ExpiryParser::new(self.indefinite_marker.clone(), self.unit)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Local wall-clock hour of the daily scan.
    #[serde(default = "default_notify_hour")]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
    /// Days-before-expiry values that trigger a notification.
    #[serde(default = "default_lead_days")]
    pub lead_days: Vec<u32>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            hour: default_notify_hour(),
            minute: 0,
            lead_days: default_lead_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_model")]
    pub vision_model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            vision_model: default_model(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Push relay endpoint; scans cannot dispatch without it.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Name of the env var holding the relay bearer token, if any.
    #[serde(default = "default_push_token_env")]
    pub auth_token_env: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            auth_token_env: default_push_token_env(),
        }
    }
}

/// Load configuration from `explicit` if given, else from the user config
/// dir (`<config>/larder/config.toml`), else defaults.
///
/// # Errors
///
/// Returns an error when an explicitly named file is missing or when any
/// present file fails to read or parse.
pub fn load_config(explicit: Option<&Path>) -> Result<LarderConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let Some(config_dir) = dirs::config_dir() else {
                return Ok(LarderConfig::default());
            };
            let path = config_dir.join("larder/config.toml");
            if !path.exists() {
                return Ok(LarderConfig::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<LarderConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the store path: CLI flag > config > platform data dir.
#[must_use]
pub fn resolve_store_path(cli_db: Option<&Path>, config: &LarderConfig) -> PathBuf {
    if let Some(path) = cli_db {
        return path.to_path_buf();
    }
    if let Some(path) = &config.store.path {
        return path.clone();
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("larder/larder.sqlite3")
}

fn default_indefinite_marker() -> String {
    DEFAULT_INDEFINITE_MARKER.to_string()
}

const fn default_notify_hour() -> u32 {
    18
}

fn default_lead_days() -> Vec<u32> {
    vec![3]
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_model() -> String {
    "gpt-4.1".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_push_token_env() -> String {
    "LARDER_PUSH_TOKEN".to_string()
}
