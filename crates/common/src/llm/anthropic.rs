//! Anthropic Messages API

use reqwest::header::{HeaderMap, HeaderName};
use serde::{Deserialize, Serialize};

use super::http::{chat_messages, header_value, ChatMessage, ChatProtocol, Completion};
use super::{BackendError, GenerationSettings, ProviderKind};

/// Value of the `anthropic-version` header when none is configured
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

pub struct Anthropic;

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    content: Option<Vec<ContentBlock>>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

impl ChatProtocol for Anthropic {
    const KIND: ProviderKind = ProviderKind::Anthropic;
    const DISPLAY_NAME: &'static str = "Anthropic";
    const DEFAULT_ENDPOINT: &'static str = "https://api.anthropic.com/v1/messages";
    const DEFAULT_MODEL: &'static str = "claude-3-5-sonnet-latest";
    const CREDENTIAL_ENV: Option<&'static str> = Some("ANTHROPIC_API_KEY");

    type Request = MessagesRequest;
    type Response = MessagesResponse;

    fn headers(api_key: Option<&str>, version: Option<&str>) -> Result<HeaderMap, BackendError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(HeaderName::from_static("x-api-key"), header_value::<Self>(key)?);
        }
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            header_value::<Self>(version.unwrap_or(DEFAULT_API_VERSION))?,
        );
        Ok(headers)
    }

    fn build_request(prompt: &str, settings: &GenerationSettings) -> Self::Request {
        MessagesRequest {
            model: settings.model.clone(),
            max_tokens: settings.max_output_tokens,
            temperature: settings.temperature,
            // The system instruction travels as a top-level field here.
            messages: chat_messages(None, prompt),
            system: settings.system.clone(),
        }
    }

    fn parse_response(response: Self::Response) -> Completion {
        let text = response
            .content
            .unwrap_or_default()
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        let (input_tokens, output_tokens) = response
            .usage
            .map(|u| (u.input_tokens, u.output_tokens))
            .unwrap_or((None, None));

        Completion {
            text,
            input_tokens,
            output_tokens,
        }
    }
}
