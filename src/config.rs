// src/config.rs
//! Service configuration: feed endpoints, fetch limits and the conversion policy.
//!
//! Lookup order:
//! 1) $QUAKE_CONFIG_PATH (must exist when set)
//! 2) config/quake.toml
//! 3) built-in defaults
//!
//! `QUAKE_FORCE` / `QUAKE_IGNORE_WARNING` override the policy section afterwards.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::ReportType;
use crate::pipeline::ConversionPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "config/quake.toml";
pub const ENV_CONFIG_PATH: &str = "QUAKE_CONFIG_PATH";
pub const ENV_FORCE: &str = "QUAKE_FORCE";
pub const ENV_IGNORE_WARNING: &str = "QUAKE_IGNORE_WARNING";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuakeConfig {
    pub feeds: FeedSettings,
    pub http: HttpLimits,
    pub policy: ConversionPolicy,
}

/// Where events are discovered and where their documents live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// High-frequency feed (eqvol.xml).
    pub realtime_url: String,
    /// Long-term feed (eqvol_l.xml).
    pub longterm_url: String,
    /// Prefix stripped from links and prepended when fetching a report.
    pub data_base_url: String,
    /// Base URL used instead of `data_base_url` for debug requests.
    pub fixture_base_url: String,
    /// Products extracted from the feeds.
    pub report_types: Vec<ReportType>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            realtime_url: "https://www.data.jma.go.jp/developer/xml/feed/eqvol.xml".to_string(),
            longterm_url: "https://www.data.jma.go.jp/developer/xml/feed/eqvol_l.xml".to_string(),
            data_base_url: "https://www.data.jma.go.jp/developer/xml/data/".to_string(),
            fixture_base_url: "https://raw.githubusercontent.com/nexryai/quake/main/test/examples/"
                .to_string(),
            report_types: ReportType::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpLimits {
    pub timeout_secs: u64,
    pub max_body_bytes: usize,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl QuakeConfig {
    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: QuakeConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.checked()
    }

    /// Load using env var + fallbacks, then apply policy overrides from the environment.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };

        if let Some(force) = parse_bool_env(std::env::var(ENV_FORCE).ok()) {
            cfg.policy.force = force;
        }
        if let Some(ignore) = parse_bool_env(std::env::var(ENV_IGNORE_WARNING).ok()) {
            cfg.policy.ignore_warning = ignore;
        }
        Ok(cfg)
    }

    fn checked(self) -> Result<Self> {
        if self.feeds.report_types.is_empty() {
            return Err(anyhow!("feeds.report_types must name at least one report type"));
        }
        if self.http.timeout_secs == 0 || self.http.max_body_bytes == 0 {
            return Err(anyhow!("http limits must be non-zero"));
        }
        Ok(self)
    }
}

// "1"/"true"/"yes"/"on" and their negatives; anything else is ignored.
fn parse_bool_env(raw: Option<String>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
