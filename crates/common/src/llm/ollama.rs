//! Ollama local chat endpoint

use serde::{Deserialize, Serialize};

use super::http::{chat_messages, ChatMessage, ChatProtocol, Completion};
use super::{GenerationSettings, ProviderKind};

pub struct Ollama;

#[derive(Debug, Serialize)]
pub struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatProtocol for Ollama {
    const KIND: ProviderKind = ProviderKind::Ollama;
    const DISPLAY_NAME: &'static str = "Ollama";
    const DEFAULT_ENDPOINT: &'static str = "http://localhost:11434";
    const DEFAULT_MODEL: &'static str = "llama3.1";
    // Local inference is slow on modest hardware.
    const DEFAULT_TIMEOUT_SECS: u64 = 180;
    const CREDENTIAL_ENV: Option<&'static str> = None;

    type Request = OllamaChatRequest;
    type Response = OllamaChatResponse;

    fn endpoint(base: &str) -> String {
        format!("{}/api/chat", base.trim_end_matches('/'))
    }

    fn build_request(prompt: &str, settings: &GenerationSettings) -> Self::Request {
        OllamaChatRequest {
            model: settings.model.clone(),
            messages: chat_messages(settings.system.as_deref(), prompt),
            stream: false,
            options: OllamaOptions {
                temperature: settings.temperature,
            },
        }
    }

    fn parse_response(response: Self::Response) -> Completion {
        Completion {
            text: response.message.and_then(|m| m.content).unwrap_or_default(),
            input_tokens: response.prompt_eval_count,
            output_tokens: response.eval_count,
        }
    }
}
