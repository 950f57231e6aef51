//! Shared HTTP call path for chat-style providers

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use super::{
    non_empty, resolve_api_key, BackendError, GenerationResult, GenerationSettings, Generator,
    ProviderKind,
};
use crate::config::{LlmConfig, ProviderConfig};

/// Default request timeout for hosted providers
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Text and usage read from a provider response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// Per-provider request builder and response parser
pub trait ChatProtocol: Send + Sync + 'static {
    const KIND: ProviderKind;

    /// Human-readable provider name
    const DISPLAY_NAME: &'static str;

    const DEFAULT_ENDPOINT: &'static str;
    const DEFAULT_MODEL: &'static str;
    const DEFAULT_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT_SECS;

    /// Environment variable holding the credential, if one is required
    const CREDENTIAL_ENV: Option<&'static str>;

    type Request: Serialize + Send;
    type Response: DeserializeOwned + Send;

    /// Full URL to POST to, given the configured (or default) endpoint
    fn endpoint(base: &str) -> String {
        base.to_string()
    }

    /// Auth and versioning headers
    fn headers(api_key: Option<&str>, _version: Option<&str>) -> Result<HeaderMap, BackendError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(AUTHORIZATION, header_value::<Self>(&format!("Bearer {key}"))?);
        }
        Ok(headers)
    }

    fn build_request(prompt: &str, settings: &GenerationSettings) -> Self::Request;

    fn parse_response(response: Self::Response) -> Completion;
}

/// Header value, rejecting credentials with characters HTTP cannot carry
pub(crate) fn header_value<P: ChatProtocol + ?Sized>(value: &str) -> Result<HeaderValue, BackendError> {
    HeaderValue::from_str(value).map_err(|e| BackendError::Configuration {
        provider: P::KIND.to_string(),
        message: format!("invalid header value: {e}"),
    })
}

/// One message in a chat-style request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Optional system message followed by the user prompt
pub(crate) fn chat_messages(system: Option<&str>, prompt: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(ChatMessage {
            role: "system",
            content: system.to_string(),
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: prompt.to_string(),
    });
    messages
}

/// HTTP backend for one provider protocol
pub struct HttpBackend<P: ChatProtocol> {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    api_version: Option<String>,
    settings: GenerationSettings,
    _protocol: PhantomData<P>,
}

impl<P: ChatProtocol> HttpBackend<P> {
    /// Create a backend with explicit settings
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        api_version: Option<String>,
        settings: GenerationSettings,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| BackendError::Configuration {
                provider: P::KIND.to_string(),
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: P::endpoint(&endpoint),
            api_key,
            api_version,
            settings,
            _protocol: PhantomData,
        })
    }

    /// Create a backend from the shared LLM settings and its provider section
    pub fn from_config(llm: &LlmConfig, provider: &ProviderConfig) -> Result<Self, BackendError> {
        let settings = GenerationSettings {
            model: non_empty(llm.model.as_deref()).unwrap_or_else(|| P::DEFAULT_MODEL.to_string()),
            temperature: llm.temperature,
            max_output_tokens: llm.max_output_tokens,
            system: non_empty(llm.system.as_deref()),
            timeout: Duration::from_secs(llm.timeout_secs.unwrap_or(P::DEFAULT_TIMEOUT_SECS)),
        };
        let endpoint = non_empty(provider.base_url.as_deref())
            .unwrap_or_else(|| P::DEFAULT_ENDPOINT.to_string());

        Self::new(
            endpoint,
            resolve_api_key(provider, P::CREDENTIAL_ENV),
            non_empty(provider.version.as_deref()),
            settings,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    fn provider(&self) -> String {
        P::KIND.to_string()
    }
}

#[async_trait]
impl<P: ChatProtocol> Generator for HttpBackend<P> {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, BackendError> {
        if let (None, Some(key)) = (&self.api_key, P::CREDENTIAL_ENV) {
            return Err(BackendError::MissingCredential {
                provider: self.provider(),
                key: key.to_string(),
            });
        }

        let headers = P::headers(self.api_key.as_deref(), self.api_version.as_deref())?;
        let request = P::build_request(prompt, &self.settings);

        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Transport {
                provider: self.provider(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Http {
                provider: self.provider(),
                status,
                body,
            });
        }

        let parsed: P::Response = response.json().await.map_err(|e| BackendError::Decode {
            provider: self.provider(),
            message: e.to_string(),
        })?;
        let time_s = start.elapsed().as_secs_f64();

        let completion = P::parse_response(parsed);
        let text = if completion.text.trim().is_empty() {
            format!("(No text returned from {}.)", P::DISPLAY_NAME)
        } else {
            completion.text
        };

        Ok(GenerationResult {
            text,
            input_tokens: completion.input_tokens,
            output_tokens: completion.output_tokens,
            time_s,
        })
    }

    fn name(&self) -> &str {
        P::KIND.as_str()
    }
}
