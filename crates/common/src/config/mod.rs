//! Configuration management for the ADS demo
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - A `.env` file in the working directory
//! - Default values
//!
//! Every field has a documented default, so an empty environment yields a
//! runnable demo on the offline mock backend.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Data pack locations
    #[serde(default)]
    pub data: DataConfig,

    /// Generation backend selection and settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Line-delimited JSON file of context items
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,

    /// JSON file holding `{"questions": [...]}`
    #[serde(default = "default_questions_path")]
    pub questions_path: PathBuf,

    /// JSON file of precomputed answers (object-of-objects or array)
    #[serde(default = "default_precomputed_path")]
    pub precomputed_path: PathBuf,

    /// Display name of the loaded pack
    #[serde(default = "default_pack_name")]
    pub pack_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Backend name: openai, anthropic, openrouter, ollama, mock
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name (provider default when absent)
    pub model: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Optional system instruction sent alongside the prompt
    pub system: Option<String>,

    /// Request timeout in seconds (provider default when absent)
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub openai: ProviderConfig,

    #[serde(default)]
    pub anthropic: ProviderConfig,

    #[serde(default)]
    pub openrouter: ProviderConfig,

    #[serde(default)]
    pub ollama: ProviderConfig,
}

/// Per-provider endpoint and credential
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Credential; falls back to the provider's conventional env var
    pub api_key: Option<String>,

    /// Endpoint URL (base URL for ollama)
    pub base_url: Option<String>,

    /// API version header value (anthropic only)
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default)]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8888 }
fn default_corpus_path() -> PathBuf { PathBuf::from("data/golden_sample_pack/golden_nodes.jsonl") }
fn default_questions_path() -> PathBuf { PathBuf::from("data/golden_sample_pack/demo_questions.json") }
fn default_precomputed_path() -> PathBuf { PathBuf::from("data/precomputed_answers.json") }
fn default_pack_name() -> String { "Golden_Ethics_Sample_v1".to_string() }
fn default_provider() -> String { "mock".to_string() }
fn default_temperature() -> f32 { 0.2 }
fn default_max_output_tokens() -> u32 { 900 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { "adsdemo".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            questions_path: default_questions_path(),
            precomputed_path: default_precomputed_path(),
            pack_name: default_pack_name(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            system: None,
            timeout_secs: None,
            openai: ProviderConfig::default(),
            anthropic: ProviderConfig::default(),
            openrouter: ProviderConfig::default(),
            ollama: ProviderConfig::default(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: 0,
            service_name: default_service_name(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, config files and the environment
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is the common case, not an error.
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__LLM__PROVIDER=openai
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific config file, still honouring APP__ overrides
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Address string the HTTP layer binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
