//! Configuration for the phone ledger service.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Snapshot storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Image extraction configuration
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in bytes (base64 images are large)
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Enable persistence (if false, both stores are in-memory only)
    #[serde(default = "default_true")]
    pub persist: bool,

    /// Snapshot of the phone number records
    #[serde(default = "default_phone_numbers_path")]
    pub phone_numbers_path: PathBuf,

    /// Snapshot of numbers staged for review
    #[serde(default = "default_staging_path")]
    pub staging_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Google AI API key
    #[serde(default)]
    pub api_key: String,

    /// API base URL
    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    /// Vision model used for extraction
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Where uploaded images are written while the model reads them
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            body_limit: default_body_limit(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persist: true,
            phone_numbers_path: default_phone_numbers_path(),
            staging_path: default_staging_path(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_gemini_url(),
            model: default_model(),
            timeout: default_timeout(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8000
}

fn default_body_limit() -> usize {
    crate::api::DEFAULT_BODY_LIMIT
}

fn default_true() -> bool {
    true
}

fn default_phone_numbers_path() -> PathBuf {
    PathBuf::from("phone_numbers_db.json")
}

fn default_staging_path() -> PathBuf {
    PathBuf::from("gemini_flash8b_temp_db.json")
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}

fn default_model() -> String {
    "gemini-1.5-flash-8b".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nested keys use `__`, e.g. `GEMINI__API_KEY` or `STORAGE__PERSIST`.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
