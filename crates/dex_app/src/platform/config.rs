use std::fs;
use std::path::Path;
use std::time::Duration;

use dex_engine::{
    CacheSettings, EngineConfig, GatewaySettings, RosterSettings, DEFAULT_API_BASE,
    DEFAULT_ENRICH_CONCURRENCY, FULL_ROSTER_CEILING,
};
use anyhow::Context;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub(crate) const CONFIG_FILENAME: &str = "dex.ron";

/// User-tunable settings read from `dex.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub api_base: String,
    pub locale: String,
    pub page_size: u64,
    /// `None` lists everything upstream reports.
    pub roster_ceiling: Option<u64>,
    pub category_slice: usize,
    pub enrich_concurrency: usize,
    pub stale_secs: u64,
    pub gc_secs: u64,
    pub failure_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let cache = CacheSettings::default();
        let roster = RosterSettings::default();
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            locale: dex_core::l10n::DEFAULT_LOCALE.to_string(),
            page_size: roster.page_size,
            roster_ceiling: Some(FULL_ROSTER_CEILING),
            category_slice: roster.category_slice,
            enrich_concurrency: DEFAULT_ENRICH_CONCURRENCY,
            stale_secs: cache.stale_time.as_secs(),
            gc_secs: cache.gc_time.as_secs(),
            failure_ttl_secs: cache.failure_ttl.as_secs(),
            request_timeout_secs: GatewaySettings::default().request_timeout.as_secs(),
            log_level: "info".to_string(),
            log_destination: LogDestination::File,
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> LevelFilter {
        dex_logging::parse_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            gateway: GatewaySettings {
                base_url: self.api_base.clone(),
                request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
                ..GatewaySettings::default()
            },
            cache: CacheSettings {
                stale_time: Duration::from_secs(self.stale_secs),
                gc_time: Duration::from_secs(self.gc_secs),
                failure_ttl: Duration::from_secs(self.failure_ttl_secs),
            },
            roster: RosterSettings {
                page_size: self.page_size,
                ceiling: self.roster_ceiling,
                category_slice: self.category_slice,
            },
            enrich_concurrency: self.enrich_concurrency,
            locale: self.locale.clone(),
        }
    }
}

/// Reads `dir/dex.ron`. A missing file yields the defaults.
///
/// Runs before logging is up, so problems are returned for the caller to report.
pub(crate) fn load_config(dir: &Path) -> anyhow::Result<AppConfig> {
    let path = dir.join(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config from {}", path.display()));
        }
    };
    ron::from_str(&content).with_context(|| format!("parsing config from {}", path.display()))
}
