//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub x: XConfig,

    #[serde(default)]
    pub feeds: FeedsConfig,

    #[serde(default)]
    pub engagement: EngagementConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Offset used to render post dates and times
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i8,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Where `run` writes the merged timeline; unset disables snapshots
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_x_bearer_token_env")]
    pub bearer_token_env: String,

    #[serde(default = "default_x_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub accounts: Vec<String>,

    #[serde(default = "default_x_max_results")]
    pub max_results: u32,

    /// Posts tagged with another language are dropped; empty keeps everything
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_max_items_per_feed")]
    pub max_items_per_feed: usize,

    #[serde(default = "default_feed_retries")]
    pub retries: u32,

    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub sources: Vec<FeedSourceConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSourceConfig {
    /// Platform is inferred from the key prefix (`instagram_`, `facebook_`, `youtube`)
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Fixed seed for reproducible synthetic engagement
    #[serde(default)]
    pub seed: Option<u64>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_utc_offset_hours() -> i8 {
    3
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_x_bearer_token_env() -> String {
    "X_BEARER_TOKEN".to_string()
}

fn default_x_base_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_x_max_results() -> u32 {
    20
}

fn default_language() -> String {
    "tr".to_string()
}

fn default_max_items_per_feed() -> usize {
    15
}

fn default_feed_retries() -> u32 {
    3
}

fn default_backoff_secs() -> u64 {
    1
}

fn default_feed_timeout() -> u64 {
    10
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            utc_offset_hours: default_utc_offset_hours(),
            cache_ttl_secs: default_cache_ttl_secs(),
            snapshot_path: None,
        }
    }
}

impl Default for XConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bearer_token_env: default_x_bearer_token_env(),
            base_url: default_x_base_url(),
            accounts: vec![],
            max_results: default_x_max_results(),
            language: default_language(),
        }
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items_per_feed: default_max_items_per_feed(),
            retries: default_feed_retries(),
            backoff_secs: default_backoff_secs(),
            timeout_secs: default_feed_timeout(),
            sources: vec![],
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SOCIAL_FEED")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        time::UtcOffset::from_hms(self.general.utc_offset_hours, 0, 0).with_context(|| {
            format!(
                "general.utc_offset_hours out of range: {}",
                self.general.utc_offset_hours
            )
        })?;

        for source in &self.feeds.sources {
            if source.key.trim().is_empty() || source.url.trim().is_empty() {
                anyhow::bail!("feeds.sources entries need both a key and a url");
            }
        }
        Ok(())
    }

    pub fn utc_offset(&self) -> time::UtcOffset {
        time::UtcOffset::from_hms(self.general.utc_offset_hours, 0, 0)
            .unwrap_or(time::UtcOffset::UTC)
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# social-feed configuration

[general]
log_level = "info"
# Dates and times are rendered at this offset (Turkey is +3)
utc_offset_hours = 3
cache_ttl_secs = 300
# snapshot_path = "./feed.json"

[x]
enabled = true
bearer_token_env = "X_BEARER_TOKEN"
base_url = "https://api.twitter.com"
accounts = ["example_account"]
max_results = 20
language = "tr"

[feeds]
enabled = true
max_items_per_feed = 15
retries = 3
backoff_secs = 1
timeout_secs = 10

[[feeds.sources]]
key = "instagram_main"
url = "https://rss.app/feeds/example-instagram.xml"

[[feeds.sources]]
key = "facebook_page"
url = "https://rss.app/feeds/example-facebook.xml"

[[feeds.sources]]
key = "youtube"
url = "https://www.youtube.com/feeds/videos.xml?channel_id=EXAMPLE"

[engagement]
# seed = 42
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_toml_parses_with_expected_values() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();

        assert_eq!(config.general.utc_offset_hours, 3);
        assert_eq!(config.general.cache_ttl_secs, 300);
        assert_eq!(config.x.accounts, vec!["example_account"]);
        assert_eq!(config.feeds.sources.len(), 3);
        assert_eq!(config.feeds.sources[2].key, "youtube");
        assert_eq!(config.engagement.seed, None);
        config.validate().unwrap();
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert!(config.x.enabled);
        assert_eq!(config.x.language, "tr");
        assert_eq!(config.feeds.retries, 3);
        assert_eq!(config.feeds.timeout_secs, 10);
        assert_eq!(config.utc_offset(), time::UtcOffset::from_hms(3, 0, 0).unwrap());
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let config: AppConfig = toml::from_str("[general]\nutc_offset_hours = 30\n").unwrap();
        assert!(config.validate().is_err());
    }
}
