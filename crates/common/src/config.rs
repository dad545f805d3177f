//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Remote gallery store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Upload pipeline configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Gallery viewer configuration.
    #[serde(default)]
    pub viewer: ViewerConfig,
}

/// Remote gallery store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the remote store.
    #[serde(default = "default_store_url")]
    pub base_url: String,
    /// Request timeout in seconds for store calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Upload pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted content size in bytes.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
    /// Chunk size used when streaming content to storage.
    #[serde(default = "default_chunk_size_bytes")]
    pub chunk_size_bytes: usize,
}

/// Gallery viewer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// Auto-advance interval in seconds.
    #[serde(default = "default_advance_interval_secs")]
    pub advance_interval_secs: u64,
    /// Minimum horizontal swipe distance (pixels) that triggers navigation.
    #[serde(default = "default_swipe_threshold_px")]
    pub swipe_threshold_px: f32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
            chunk_size_bytes: default_chunk_size_bytes(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            advance_interval_secs: default_advance_interval_secs(),
            swipe_threshold_px: default_swipe_threshold_px(),
        }
    }
}

fn default_store_url() -> String {
    "http://localhost:3000".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_size_bytes() -> u64 {
    32 * 1024 * 1024
}

const fn default_chunk_size_bytes() -> usize {
    64 * 1024
}

const fn default_advance_interval_secs() -> u64 {
    5
}

const fn default_swipe_threshold_px() -> f32 {
    50.0
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `VITRINE_ENV`)
    /// 3. Environment variables with `VITRINE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("VITRINE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("VITRINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("VITRINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
