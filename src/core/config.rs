use super::provider::{ProviderId, ProviderSpec};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = concat!("feedgate/", env!("CARGO_PKG_VERSION"));

/// Deployment mode; only affects how much failure detail callers see.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct CacheConfig {
    pub max_entries: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProviderOverride {
    pub base_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    /// `0` removes the gate entirely.
    pub min_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub providers: BTreeMap<ProviderId, ProviderOverride>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            environment: Environment::default(),
            user_agent: default_user_agent(),
            cache: CacheConfig::default(),
            providers: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Loads the file at the default location, or compiled-in defaults when
    /// there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "feedgate", "feedgate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Compiled-in defaults with this file's overrides applied, one spec per
    /// provider.
    pub fn resolve_specs(&self) -> Result<Vec<ProviderSpec>> {
        ProviderId::ALL
            .into_iter()
            .map(|id| {
                let mut spec = ProviderSpec::default_for(id);
                let Some(overrides) = self.providers.get(&id) else {
                    return Ok(spec);
                };
                if let Some(base_url) = &overrides.base_url {
                    Url::parse(base_url)
                        .with_context(|| format!("Invalid base_url for {id}: {base_url}"))?;
                    spec.base_url = base_url.trim_end_matches('/').to_string();
                }
                if let Some(ttl) = overrides.ttl_secs {
                    spec.ttl = Duration::from_secs(ttl);
                }
                if let Some(timeout) = overrides.timeout_secs {
                    anyhow::ensure!(timeout > 0, "timeout_secs for {id} must be positive");
                    spec.timeout = Duration::from_secs(timeout);
                }
                if let Some(interval) = overrides.min_interval_ms {
                    spec.min_interval = (interval > 0).then(|| Duration::from_millis(interval));
                }
                debug!(provider = %id, ?spec, "Applied provider overrides");
                Ok(spec)
            })
            .collect()
    }
}
