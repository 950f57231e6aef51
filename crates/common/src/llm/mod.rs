//! Generation backend abstraction
//!
//! Provides a unified interface for the supported text-generation providers:
//! - OpenAI (Responses API)
//! - Anthropic (Messages API)
//! - OpenRouter (chat completions)
//! - Ollama (local `/api/chat`)
//! - Mock (offline, deterministic)
//!
//! The active backend is selected once from configuration. HTTP providers
//! share one call path in [`http::HttpBackend`], parameterized by a
//! per-provider [`ChatProtocol`] that builds the request and reads the
//! response.

mod anthropic;
mod http;
mod mock;
mod ollama;
mod openai;
mod openrouter;

pub use anthropic::Anthropic;
pub use http::{ChatProtocol, Completion, HttpBackend};
pub use mock::MockBackend;
pub use ollama::Ollama;
pub use openai::OpenAi;
pub use openrouter::OpenRouter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::{LlmConfig, ProviderConfig};
use crate::metrics;

/// Backend-agnostic generation output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub time_s: f64,
}

impl GenerationResult {
    /// Error-shaped result carrying the diagnostic as its text
    pub fn failed(err: &BackendError) -> Self {
        Self {
            text: err.to_string(),
            input_tokens: None,
            output_tokens: None,
            time_s: 0.0,
        }
    }
}

/// Failures at the backend boundary.
///
/// Every message starts with `[LLM ERROR]` and names the provider, so it can
/// be shown to the user as-is.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    #[error("[LLM ERROR] Unknown LLM provider '{name}'. Use openai|anthropic|openrouter|ollama|mock.")]
    UnknownProvider { name: String },

    #[error("[LLM ERROR] Missing {key} for provider '{provider}' in configuration or environment.")]
    MissingCredential { provider: String, key: String },

    #[error("[LLM ERROR] Invalid configuration for provider '{provider}': {message}")]
    Configuration { provider: String, message: String },

    #[error("[LLM ERROR] HTTP {status} from provider '{provider}'.\n{body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("[LLM ERROR] Network error calling provider '{provider}': {message}")]
    Transport { provider: String, message: String },

    #[error("[LLM ERROR] Unreadable response from provider '{provider}': {message}")]
    Decode { provider: String, message: String },
}

/// Closed set of backend names accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    OpenRouter,
    Ollama,
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Mock => "mock",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "ollama" => Ok(ProviderKind::Ollama),
            "mock" | "" => Ok(ProviderKind::Mock),
            other => Err(BackendError::UnknownProvider {
                name: other.to_string(),
            }),
        }
    }
}

/// Model parameters shared by every HTTP provider
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub system: Option<String>,
    pub timeout: Duration,
}

/// Capability every backend offers: prompt in, generated text out
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for a prompt
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, BackendError>;

    /// Provider name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Whether this is the offline mock backend
    fn is_mock(&self) -> bool {
        false
    }
}

/// Call the generator and fold any failure into an error-shaped result
pub async fn generate_or_report(generator: &dyn Generator, prompt: &str) -> GenerationResult {
    match generator.generate(prompt).await {
        Ok(result) => {
            metrics::record_generation(generator.name(), result.time_s, true);
            tracing::info!(
                provider = generator.name(),
                time_s = result.time_s,
                input_tokens = ?result.input_tokens,
                output_tokens = ?result.output_tokens,
                "Generation completed"
            );
            result
        }
        Err(e) => {
            metrics::record_generation(generator.name(), 0.0, false);
            tracing::warn!(provider = generator.name(), error = %e, "Generation failed");
            GenerationResult::failed(&e)
        }
    }
}

/// The active backend, selected once at startup
pub enum Backend {
    OpenAi(HttpBackend<OpenAi>),
    Anthropic(HttpBackend<Anthropic>),
    OpenRouter(HttpBackend<OpenRouter>),
    Ollama(HttpBackend<Ollama>),
    Mock(MockBackend),
    /// Selection failed; every call reports the configuration error
    Misconfigured(BackendError),
}

impl Backend {
    /// Build the backend named by `config.provider`
    pub fn from_config(config: &LlmConfig) -> Result<Self, BackendError> {
        let kind: ProviderKind = config.provider.parse()?;
        let backend = match kind {
            ProviderKind::OpenAi => Backend::OpenAi(HttpBackend::from_config(config, &config.openai)?),
            ProviderKind::Anthropic => {
                Backend::Anthropic(HttpBackend::from_config(config, &config.anthropic)?)
            }
            ProviderKind::OpenRouter => {
                Backend::OpenRouter(HttpBackend::from_config(config, &config.openrouter)?)
            }
            ProviderKind::Ollama => Backend::Ollama(HttpBackend::from_config(config, &config.ollama)?),
            ProviderKind::Mock => Backend::Mock(MockBackend::new()),
        };
        Ok(backend)
    }
}

/// Select the configured backend, keeping configuration failures as a
/// backend that reports them on every call.
pub fn select_backend(config: &LlmConfig) -> Backend {
    match Backend::from_config(config) {
        Ok(backend) => {
            tracing::info!(provider = backend.name(), "LLM provider selected");
            backend
        }
        Err(e) => {
            tracing::error!(provider = %config.provider, error = %e, "LLM provider misconfigured");
            Backend::Misconfigured(e)
        }
    }
}

#[async_trait]
impl Generator for Backend {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, BackendError> {
        match self {
            Backend::OpenAi(b) => b.generate(prompt).await,
            Backend::Anthropic(b) => b.generate(prompt).await,
            Backend::OpenRouter(b) => b.generate(prompt).await,
            Backend::Ollama(b) => b.generate(prompt).await,
            Backend::Mock(b) => b.generate(prompt).await,
            Backend::Misconfigured(e) => Err(e.clone()),
        }
    }

    fn name(&self) -> &str {
        match self {
            Backend::OpenAi(b) => b.name(),
            Backend::Anthropic(b) => b.name(),
            Backend::OpenRouter(b) => b.name(),
            Backend::Ollama(b) => b.name(),
            Backend::Mock(b) => b.name(),
            Backend::Misconfigured(_) => "misconfigured",
        }
    }

    fn is_mock(&self) -> bool {
        matches!(self, Backend::Mock(_))
    }
}

/// Configured value, treating empty strings as absent
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Credential from configuration, falling back to the conventional env var
pub(crate) fn resolve_api_key(provider: &ProviderConfig, env_var: Option<&str>) -> Option<String> {
    non_empty(provider.api_key.as_deref()).or_else(|| {
        env_var.and_then(|name| non_empty(std::env::var(name).ok().as_deref()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" Anthropic ".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("OPENROUTER".parse::<ProviderKind>().unwrap(), ProviderKind::OpenRouter);
        assert_eq!("ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert_eq!("".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);

        let err = "gpt-neo".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, BackendError::UnknownProvider { .. }));
        assert!(err.to_string().starts_with("[LLM ERROR]"));
    }

    #[test]
    fn test_failed_result_shape() {
        let err = BackendError::Http {
            provider: "anthropic".into(),
            status: 401,
            body: "invalid x-api-key".into(),
        };
        let result = GenerationResult::failed(&err);
        assert!(result.text.contains("HTTP 401"));
        assert!(result.text.contains("anthropic"));
        assert!(result.text.contains("invalid x-api-key"));
        assert_eq!(result.input_tokens, None);
        assert_eq!(result.output_tokens, None);
        assert_eq!(result.time_s, 0.0);
    }

    #[test]
    fn test_default_config_selects_mock() {
        let backend = select_backend(&LlmConfig::default());
        assert!(backend.is_mock());
        assert_eq!(backend.name(), "mock");
    }

    #[tokio::test]
    async fn test_unknown_provider_reports_on_every_call() {
        let config = LlmConfig {
            provider: "skynet".to_string(),
            ..LlmConfig::default()
        };
        let backend = select_backend(&config);
        assert!(!backend.is_mock());

        for _ in 0..2 {
            let err = backend.generate("hello").await.unwrap_err();
            assert!(matches!(err, BackendError::UnknownProvider { .. }));
        }

        let reported = generate_or_report(&backend, "hello").await;
        assert!(reported.text.contains("Unknown LLM provider 'skynet'"));
    }

    #[test]
    fn test_configured_key_wins_over_env() {
        let provider = ProviderConfig {
            api_key: Some("sk-configured".to_string()),
            ..ProviderConfig::default()
        };
        assert_eq!(
            resolve_api_key(&provider, Some("ADSDEMO_TEST_UNSET_KEY")).as_deref(),
            Some("sk-configured")
        );

        let blank = ProviderConfig {
            api_key: Some("   ".to_string()),
            ..ProviderConfig::default()
        };
        assert_eq!(resolve_api_key(&blank, Some("ADSDEMO_TEST_UNSET_KEY")), None);
    }
}
