//! Offline backend used when no provider is configured

use async_trait::async_trait;
use std::time::Instant;

use super::{BackendError, GenerationResult, Generator, ProviderKind};

/// Prompt characters echoed back in mock output
pub const MOCK_ECHO_CHARS: usize = 500;

/// Backend that never leaves the process.
///
/// Always succeeds with a fixed notice plus the head of the prompt, so the
/// demo stays usable without credentials.
#[derive(Debug, Clone, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Generator for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, BackendError> {
        let start = Instant::now();
        let head: String = prompt.chars().take(MOCK_ECHO_CHARS).collect();

        let text = format!(
            "MOCK MODE is enabled (llm.provider=mock or missing).\n\n\
             To make this demo fully interactive, choose a provider and supply an API key.\n\
             Example:\n  \
             APP__LLM__PROVIDER=openai\n  \
             APP__LLM__OPENAI__API_KEY=sk-...\n  \
             APP__LLM__MODEL=gpt-4o\n\n\
             Prompt received (first {MOCK_ECHO_CHARS} chars):\n{head}"
        );

        Ok(GenerationResult {
            text,
            input_tokens: None,
            output_tokens: None,
            time_s: start.elapsed().as_secs_f64(),
        })
    }

    fn name(&self) -> &str {
        ProviderKind::Mock.as_str()
    }

    fn is_mock(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_prompt_head() {
        let backend = MockBackend::new();
        let prompt = "x".repeat(800);
        let result = backend.generate(&prompt).await.unwrap();

        assert!(result.text.starts_with("MOCK MODE is enabled"));
        assert!(result.text.contains("APP__LLM__PROVIDER=openai"));
        assert!(result.text.ends_with(&"x".repeat(MOCK_ECHO_CHARS)));
        assert!(!result.text.contains(&"x".repeat(MOCK_ECHO_CHARS + 1)));
        assert_eq!(result.input_tokens, None);
        assert_eq!(result.output_tokens, None);
        assert!(result.time_s < 0.1);
    }

    #[test]
    fn test_mock_handles_multibyte_prompt() {
        let result = tokio_test::block_on(MockBackend::new().generate("sagesse · 智慧")).unwrap();
        assert!(result.text.ends_with("sagesse · 智慧"));
        assert!(MockBackend::new().is_mock());
        assert_eq!(MockBackend::new().name(), "mock");
    }
}
