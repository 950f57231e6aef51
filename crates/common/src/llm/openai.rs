//! OpenAI Responses API

use serde::{Deserialize, Serialize};

use super::http::{ChatProtocol, Completion};
use super::{GenerationSettings, ProviderKind};

pub struct OpenAi;

#[derive(Debug, Serialize)]
pub struct ResponsesRequest {
    model: String,
    input: String,
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    output: Option<Vec<OutputItem>>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Option<Vec<ContentPart>>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
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

impl ChatProtocol for OpenAi {
    const KIND: ProviderKind = ProviderKind::OpenAi;
    const DISPLAY_NAME: &'static str = "OpenAI";
    const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1/responses";
    const DEFAULT_MODEL: &'static str = "gpt-4o";
    const CREDENTIAL_ENV: Option<&'static str> = Some("OPENAI_API_KEY");

    type Request = ResponsesRequest;
    type Response = ResponsesResponse;

    fn build_request(prompt: &str, settings: &GenerationSettings) -> Self::Request {
        ResponsesRequest {
            model: settings.model.clone(),
            input: prompt.to_string(),
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            instructions: settings.system.clone(),
        }
    }

    fn parse_response(response: Self::Response) -> Completion {
        let text = response
            .output
            .unwrap_or_default()
            .into_iter()
            .flat_map(|item| item.content.unwrap_or_default())
            .filter(|part| part.kind == "output_text" || part.kind == "text")
            .filter_map(|part| part.text)
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
