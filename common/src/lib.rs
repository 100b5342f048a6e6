/*!
common/src/lib.rs

Shared configuration types for newsdialogue.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file
- A loader merging a defaults file with an optional override file
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// G1 technology section feed.
pub const DEFAULT_FEED_URL: &str = "https://g1.globo.com/rss/g1/tecnologia/";
/// rss2json conversion endpoint; the feed address goes in the `rss_url` query parameter.
pub const DEFAULT_CONVERTER_URL: &str = "https://api.rss2json.com/v1/api.json";
pub const DEFAULT_PAGE_PATH: &str = "dialogo_filosofico.html";

/// How the latest item is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Ask the RSS-to-JSON conversion service for the feed.
    #[default]
    Converter,
    /// Download and parse the RSS/Atom document directly.
    Direct,
}

/// Feed source configuration section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub mode: FeedMode,
    pub rss_url: Option<String>,
    pub converter_url: Option<String>,
    /// Request timeout. Unset means the HTTP client's own default applies.
    pub timeout_seconds: Option<u64>,
}

impl FeedConfig {
    pub fn rss_url(&self) -> &str {
        self.rss_url.as_deref().unwrap_or(DEFAULT_FEED_URL)
    }

    pub fn converter_url(&self) -> &str {
        self.converter_url.as_deref().unwrap_or(DEFAULT_CONVERTER_URL)
    }
}

/// Remote LLM config (used if `llm.adapter = "remote"`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

/// LLM top-level config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub adapter: Option<String>, // "remote", "simulated", "failing"
    pub remote: Option<RemoteLlmConfig>,
}

/// Dialogue post-processing switches. Both default to off so the generated
/// fragment reaches the page untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Tidy title/summary (tags, source suffix, echoed title) before prompting.
    #[serde(default)]
    pub clean_news: bool,
    /// Put persona icons in front of each speaker label.
    #[serde(default)]
    pub decorate_icons: bool,
}

/// HTTP server binding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// One-shot page output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub page_path: Option<String>,
}

impl OutputConfig {
    pub fn page_path(&self) -> &str {
        self.page_path.as_deref().unwrap_or(DEFAULT_PAGE_PATH)
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub dialogue: DialogueConfig,
    pub server: Option<ServerConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration in {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Generator adapter name, `"remote"` when nothing is configured.
    pub fn llm_adapter(&self) -> &str {
        self.llm
            .as_ref()
            .and_then(|l| l.adapter.as_deref())
            .unwrap_or("remote")
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}
