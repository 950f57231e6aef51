//! Comparison orchestrator
//!
//! Produces one baseline answer and one context-augmented answer for a
//! question. With the mock backend and a loaded precomputed set the answers
//! come from the stored entries; otherwise both prompts go to the active
//! backend. Either way the caller receives the same [`ComparisonResult`]
//! shape, and backend failures show up as answer text, never as errors.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use crate::corpus::{CorpusStore, PrecomputedEntry};
use crate::llm::{generate_or_report, GenerationResult, Generator};
use crate::metrics;
use crate::prompts;
use crate::retrieval::{self, tokenize, DEFAULT_TOP_K};

/// Answer shown when the mock backend is active but nothing was precomputed
pub const NO_PRECOMPUTED_MESSAGE: &str = "Precomputed demo answers are not available, but MOCK mode is enabled.\n\n\
     Set APP__LLM__PROVIDER and an API key to run fully live.";

/// One side of the comparison, as rendered to the caller
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparedAnswer {
    pub answer: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub time_s: f64,
    pub nodes_used: usize,
    pub context_bullets: Vec<String>,
}

impl ComparedAnswer {
    /// Normalize a backend result; absent token counts become 0
    pub fn from_generation(
        result: GenerationResult,
        nodes_used: usize,
        context_bullets: Vec<String>,
    ) -> Self {
        Self {
            answer: result.text,
            input_tokens: result.input_tokens.unwrap_or(0),
            output_tokens: result.output_tokens.unwrap_or(0),
            time_s: result.time_s,
            nodes_used,
            context_bullets,
        }
    }

    fn stored(answer: String, context_bullets: Vec<String>) -> Self {
        Self {
            answer,
            nodes_used: context_bullets.len(),
            context_bullets,
            ..Self::default()
        }
    }
}

/// Baseline vs augmented answers for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub question: String,
    pub baseline: ComparedAnswer,
    pub ads: ComparedAnswer,
    /// Diagnostic payload; its shape is not part of the contract
    pub raw_metrics: Value,
}

/// Comparison path taken for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Precomputed,
    Live,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Precomputed => "precomputed",
            Mode::Live => "live",
        }
    }
}

/// Runs comparisons against an injected backend and corpus store
#[derive(Clone)]
pub struct Comparator {
    generator: Arc<dyn Generator>,
    store: Arc<CorpusStore>,
}

impl Comparator {
    pub fn new(generator: Arc<dyn Generator>, store: Arc<CorpusStore>) -> Self {
        Self { generator, store }
    }

    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    pub fn provider(&self) -> &str {
        self.generator.name()
    }

    /// Path the next comparison will take
    pub fn mode(&self) -> Mode {
        if self.generator.is_mock() && !self.store.precomputed.is_empty() {
            Mode::Precomputed
        } else {
            Mode::Live
        }
    }

    /// Compare baseline and augmented answers for `question`
    #[instrument(skip(self), fields(provider = %self.generator.name()))]
    pub async fn compare(&self, question: &str) -> ComparisonResult {
        let start = Instant::now();
        let mode = self.mode();

        let result = match mode {
            Mode::Precomputed => run_precomputed(question, &self.store.precomputed, self.provider()),
            Mode::Live => self.run_live(question).await,
        };

        let elapsed = start.elapsed().as_secs_f64();
        metrics::record_comparison(mode.as_str(), elapsed);
        info!(
            mode = mode.as_str(),
            elapsed_s = elapsed,
            nodes_used = result.ads.nodes_used,
            "Comparison completed"
        );
        result
    }

    async fn run_live(&self, question: &str) -> ComparisonResult {
        let retrieved = retrieval::retrieve(question, &self.store.items, DEFAULT_TOP_K);
        metrics::record_retrieval(retrieved.len(), retrieved.fallback);

        let items = retrieved.items();
        let plain_prompt = prompts::build_plain(question);
        let augmented_prompt = prompts::build_augmented(question, &items);

        let (baseline, augmented) = tokio::join!(
            generate_or_report(self.generator.as_ref(), &plain_prompt),
            generate_or_report(self.generator.as_ref(), &augmented_prompt),
        );

        let context_bullets: Vec<String> = items
            .iter()
            .map(|item| item.insight.trim())
            .filter(|insight| !insight.is_empty())
            .map(str::to_string)
            .collect();
        let context_sources: Vec<&str> = items.iter().map(|item| item.source.as_str()).collect();

        let baseline = ComparedAnswer::from_generation(baseline, 0, Vec::new());
        let ads = ComparedAnswer::from_generation(augmented, items.len(), context_bullets);

        let raw_metrics = json!({
            "mode": Mode::Live.as_str(),
            "provider": self.provider(),
            "relevance": retrieved.relevance,
            "context_sources": context_sources,
            "baseline": &baseline,
            "ads": &ads,
        });

        ComparisonResult {
            question: question.to_string(),
            baseline,
            ads,
            raw_metrics,
        }
    }
}

/// Pick the entry whose stored question shares the most tokens with
/// `question`. The first entry wins ties.
pub fn choose_precomputed<'a>(
    question: &str,
    entries: &'a [PrecomputedEntry],
) -> Option<&'a PrecomputedEntry> {
    let query = tokenize(question);
    let mut best: Option<(&PrecomputedEntry, usize)> = None;

    for entry in entries {
        let score = retrieval::overlap(&query, &entry.question);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((entry, score));
        }
    }
    best.map(|(entry, _)| entry)
}

/// Build a comparison from stored answers without calling any backend
pub fn run_precomputed(
    question: &str,
    entries: &[PrecomputedEntry],
    provider: &str,
) -> ComparisonResult {
    let Some(entry) = choose_precomputed(question, entries) else {
        let answer = ComparedAnswer::stored(NO_PRECOMPUTED_MESSAGE.to_string(), Vec::new());
        return ComparisonResult {
            question: question.to_string(),
            raw_metrics: json!({
                "mode": Mode::Precomputed.as_str(),
                "provider": provider,
                "baseline": &answer,
                "ads": &answer,
            }),
            baseline: answer.clone(),
            ads: answer,
        };
    };

    let question_used = if entry.question.is_empty() {
        question
    } else {
        entry.question.as_str()
    };
    info!(question_used, "Using precomputed answers");

    let baseline = ComparedAnswer::stored(entry.baseline.clone(), Vec::new());
    let ads = ComparedAnswer::stored(entry.ads.clone(), entry.context_bullets.clone());

    let raw_metrics = json!({
        "mode": Mode::Precomputed.as_str(),
        "provider": provider,
        "question_used": question_used,
        "baseline": &baseline,
        "ads": &ads,
    });

    ComparisonResult {
        question: question.to_string(),
        baseline,
        ads,
        raw_metrics,
    }
}
