//! Client configuration.
//!
//! All knobs are explicit: the core never reads the process environment.
//! [`ClientConfig::from_env`] is the one adapter for callers who want the
//! conventional `COCKPIT_*` variables, and it lives at the process boundary.

use std::env;

use serde::Deserialize;
use thiserror::Error;

const ENV_API_URL: &str = "COCKPIT_API_URL";
const ENV_API_TOKEN: &str = "COCKPIT_API_TOKEN";
const ENV_TENANT: &str = "COCKPIT_TENANT";
const ENV_CACHE_ENTRY_LIMIT: &str = "COCKPIT_CACHE_ENTRY_LIMIT";
const ENV_CACHE_TTL_MS: &str = "COCKPIT_CACHE_TTL_MS";

pub(crate) const DEFAULT_CACHE_ENTRY_LIMIT: usize = 100;
pub(crate) const DEFAULT_CACHE_TTL_MS: u64 = 100_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base URL is required (set {ENV_API_URL})")]
    MissingBaseUrl,
    #[error("invalid value for {variable}: {message}")]
    InvalidValue {
        variable: &'static str,
        message: String,
    },
}

/// Cache sizing for the default in-memory store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Enable caching; when false the client runs on a no-op store.
    pub enabled: bool,
    /// Maximum entries before oldest-unused eviction.
    pub entry_limit: usize,
    /// Time-to-live in milliseconds; expired entries read as absent.
    pub ttl_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            entry_limit: DEFAULT_CACHE_ENTRY_LIMIT,
            ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }
}

/// Configuration for [`crate::client::CockpitClient`].
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// API origin, e.g. `https://cms.example.com`. Stored without a
    /// trailing slash.
    pub base_url: String,
    /// Optional tenant; scopes API paths (`/:tenant`) and cache keys.
    #[serde(default)]
    pub tenant: Option<String>,
    /// Optional static API token sent as a bearer header.
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub cache: CacheSettings,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            tenant: None,
            api_token: None,
            cache: CacheSettings::default(),
        }
    }

    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: CacheSettings) -> Self {
        self.cache = cache;
        self
    }

    /// Base URL with the tenant segment appended, e.g.
    /// `https://cms.example.com/:site-a`.
    pub fn tenant_scoped_base_url(&self) -> String {
        match &self.tenant {
            Some(tenant) => format!("{}/:{tenant}", self.base_url),
            None => self.base_url.clone(),
        }
    }

    /// Build a configuration from `COCKPIT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var(ENV_API_URL).map_err(|_| ConfigError::MissingBaseUrl)?;
        let mut config = Self::new(base_url);
        if let Ok(token) = env::var(ENV_API_TOKEN) {
            config.api_token = Some(token);
        }
        if let Ok(tenant) = env::var(ENV_TENANT) {
            config.tenant = Some(tenant);
        }
        if let Ok(raw) = env::var(ENV_CACHE_ENTRY_LIMIT) {
            config.cache.entry_limit =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    variable: ENV_CACHE_ENTRY_LIMIT,
                    message: format!("expected an integer, got `{raw}`"),
                })?;
        }
        if let Ok(raw) = env::var(ENV_CACHE_TTL_MS) {
            config.cache.ttl_ms = raw.parse().map_err(|_| ConfigError::InvalidValue {
                variable: ENV_CACHE_TTL_MS,
                message: format!("expected an integer, got `{raw}`"),
            })?;
        }
        Ok(config)
    }
}
