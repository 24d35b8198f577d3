//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.citechat/config.json`) and environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Panel behavior (collection scope, auto-submitted message).
    #[serde(default)]
    pub panel: PanelConfig,

    /// Document-query endpoint.
    #[serde(default)]
    pub query: QueryConfig,

    /// Credential fallback when the environment has no user id.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Settings handed to the conversation controller at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelConfig {
    /// Collection that scopes every query. Unset means all collections.
    #[serde(default)]
    pub selected_collection: Option<String>,

    /// Text submitted once, automatically, when the panel opens.
    #[serde(default)]
    pub pending_message: Option<String>,

    /// How long the panel stays in `opening` before it is `open` (default 200).
    #[serde(default = "default_opening_transition_ms")]
    pub opening_transition_ms: u64,
}

/// Document-query HTTP endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    /// Base URL (default "http://127.0.0.1:8000").
    #[serde(default = "default_query_base_url")]
    pub base_url: String,

    /// Request path (default "/query").
    #[serde(default = "default_query_path")]
    pub path: String,

    /// Request timeout in seconds (default 60).
    #[serde(default = "default_query_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Authenticated user id. Overridden by CITECHAT_USER_ID env.
    pub user_id: Option<String>,
}

fn default_opening_transition_ms() -> u64 {
    200
}

fn default_query_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_query_path() -> String {
    "/query".to_string()
}

fn default_query_timeout_secs() -> u64 {
    60
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            selected_collection: None,
            pending_message: None,
            opening_transition_ms: default_opening_transition_ms(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            base_url: default_query_base_url(),
            path: default_query_path(),
            timeout_secs: default_query_timeout_secs(),
        }
    }
}

/// Resolve the user id: env CITECHAT_USER_ID overrides config. Blank values count as absent.
pub fn resolve_user_id(config: &Config) -> Option<String> {
    std::env::var("CITECHAT_USER_ID")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .auth
                .user_id
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CITECHAT_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".citechat").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, CITECHAT_CONFIG_PATH, or the default. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
