// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

const ENV_PATH: &str = "NEXT5_CONFIG_PATH";
const ENV_REFRESH_INTERVAL: &str = "REFRESH_INTERVAL_SECS";
const ENV_TICK_INTERVAL: &str = "TICK_INTERVAL_MS";

pub const DEFAULT_BASE_URL: &str = "https://api.neds.com.au/rest/v1/racing/";

fn default_refresh_interval_secs() -> u64 {
    60
}
fn default_tick_interval_ms() -> u64 {
    1_000
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_count() -> u32 {
    10
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Full refresh cadence.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Countdown / expiry sweep cadence.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Races requested per fetch (the feed's fixed request size).
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            feed: FeedConfig::default(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            count: default_count(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SessionConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading session config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing session config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $NEXT5_CONFIG_PATH
    /// 2) config/next5.toml
    /// 3) config/next5.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let toml_p = PathBuf::from("config/next5.toml");
            let json_p = PathBuf::from("config/next5.json");
            if toml_p.exists() {
                Self::load_from(&toml_p)?
            } else if json_p.exists() {
                Self::load_from(&json_p)?
            } else {
                Self::default()
            }
        };
        Ok(base.with_env_overrides())
    }

    /// `REFRESH_INTERVAL_SECS` / `TICK_INTERVAL_MS`; unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_u64(ENV_REFRESH_INTERVAL) {
            self.refresh_interval_secs = v;
        }
        if let Some(v) = env_u64(ENV_TICK_INTERVAL) {
            self.tick_interval_ms = v;
        }
        self.sanitized()
    }

    /// Replace zero intervals, empty URLs and out-of-range counts with usable values.
    pub fn sanitized(mut self) -> Self {
        if self.refresh_interval_secs == 0 {
            self.refresh_interval_secs = default_refresh_interval_secs();
        }
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = default_tick_interval_ms();
        }
        self.feed.count = self.feed.count.clamp(1, 100);
        if self.feed.timeout_secs == 0 {
            self.feed.timeout_secs = default_timeout_secs();
        }
        if self.feed.base_url.trim().is_empty() {
            self.feed.base_url = default_base_url();
        }
        self
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<SessionConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            if let Ok(v) = toml::from_str(s) {
                return Ok(v);
            }
            serde_json::from_str(s).map_err(|_| anyhow!("unsupported session config format"))
        }
    }
}
