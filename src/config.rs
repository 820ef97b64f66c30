use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// TMDB API key. The service still starts without one, but every TMDB
    /// lookup fails with a configuration error.
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,

    /// Recommendation (ML) service base URL
    #[serde(default = "default_ml_service_url")]
    pub ml_service_url: String,

    /// Timeout applied to every upstream HTTP call
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// Deadline for refreshing the ML dataset list
    #[serde(default = "default_dataset_timeout_secs")]
    pub dataset_timeout_secs: u64,

    /// How long a fetched ML dataset list is served without refetching
    #[serde(default = "default_dataset_cache_ttl_secs")]
    pub dataset_cache_ttl_secs: u64,

    /// Total attempts (first call included) for a TMDB request
    #[serde(default = "default_tmdb_max_attempts")]
    pub tmdb_max_attempts: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    /// Number of TMDB lookups issued concurrently per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between two consecutive batches
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Origin allowed by CORS (the frontend)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_ml_service_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

fn default_dataset_timeout_secs() -> u64 {
    5
}

fn default_dataset_cache_ttl_secs() -> u64 {
    300
}

fn default_tmdb_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_retry_max_delay_ms() -> u64 {
    5000
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_delay_ms() -> u64 {
    500
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tmdb_api_key: None,
            tmdb_base_url: default_tmdb_base_url(),
            ml_service_url: default_ml_service_url(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
            dataset_timeout_secs: default_dataset_timeout_secs(),
            dataset_cache_ttl_secs: default_dataset_cache_ttl_secs(),
            tmdb_max_attempts: default_tmdb_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// True when a non-empty TMDB key is configured
    pub fn tmdb_configured(&self) -> bool {
        self.tmdb_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn dataset_timeout(&self) -> Duration {
        Duration::from_secs(self.dataset_timeout_secs)
    }

    pub fn dataset_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.dataset_cache_ttl_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
