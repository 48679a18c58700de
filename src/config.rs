use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://api.pac-12.com/v3";

/// Runtime settings. Every field has a default, so a partial TOML file is fine.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub page_size: u32,
    /// Upper bound on concurrent requests across the whole pipeline.
    pub max_in_flight: usize,
    pub request_timeout_ms: u64,
    pub slow_request_warn_ms: u64,
    pub user_agent: String,
    pub page_cache_ttl_secs: u64,
    /// How close to the last record a visible row must be to ask for more.
    pub prefetch_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 10,
            max_in_flight: 8,
            request_timeout_ms: 15_000,
            slow_request_warn_ms: 5_000,
            user_agent: "vodfeed/0.1".to_string(),
            page_cache_ttl_secs: 300,
            prefetch_threshold: 1,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (explicit path or the platform config dir), then env.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file: {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("VODFEED_BASE_URL") {
            if !v.trim().is_empty() { self.base_url = v.trim().to_string(); }
        }
        self.page_size = env_parse("VODFEED_PAGE_SIZE").unwrap_or(self.page_size);
        self.max_in_flight = env_parse("VODFEED_MAX_IN_FLIGHT").unwrap_or(self.max_in_flight);
        self.request_timeout_ms = env_parse("VODFEED_REQUEST_TIMEOUT_MS").unwrap_or(self.request_timeout_ms);
        self.page_cache_ttl_secs = env_parse("VODFEED_PAGE_CACHE_TTL_SECS").unwrap_or(self.page_cache_ttl_secs);
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 { bail!("page_size must be at least 1"); }
        if self.max_in_flight == 0 { bail!("max_in_flight must be at least 1"); }
        Url::parse(&self.base_url).with_context(|| format!("invalid base_url: {}", self.base_url))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration { Duration::from_millis(self.request_timeout_ms) }
    pub fn slow_request_warn(&self) -> Duration { Duration::from_millis(self.slow_request_warn_ms) }
    pub fn page_cache_ttl(&self) -> Duration { Duration::from_secs(self.page_cache_ttl_secs) }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "vodfeed", "vodfeed").map(|p| p.config_dir().join("config.toml"))
}
