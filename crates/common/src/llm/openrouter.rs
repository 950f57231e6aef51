//! OpenRouter chat completions

use serde::{Deserialize, Serialize};

use super::http::{chat_messages, ChatMessage, ChatProtocol, Completion};
use super::{GenerationSettings, ProviderKind};

pub struct OpenRouter;

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    choices: Option<Vec<ChatChoice>>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

impl ChatProtocol for OpenRouter {
    const KIND: ProviderKind = ProviderKind::OpenRouter;
    const DISPLAY_NAME: &'static str = "OpenRouter";
    const DEFAULT_ENDPOINT: &'static str = "https://openrouter.ai/api/v1/chat/completions";
    const DEFAULT_MODEL: &'static str = "openai/gpt-4o-mini";
    const CREDENTIAL_ENV: Option<&'static str> = Some("OPENROUTER_API_KEY");

    type Request = ChatRequest;
    type Response = ChatResponse;

    fn build_request(prompt: &str, settings: &GenerationSettings) -> Self::Request {
        ChatRequest {
            model: settings.model.clone(),
            messages: chat_messages(settings.system.as_deref(), prompt),
            temperature: settings.temperature,
            max_tokens: settings.max_output_tokens,
        }
    }

    fn parse_response(response: Self::Response) -> Completion {
        let text = response
            .choices
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        let (input_tokens, output_tokens) = response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((None, None));

        Completion {
            text,
            input_tokens,
            output_tokens,
        }
    }
}
