//! ADS Demo Common Library
//!
//! The comparison engine behind the demo gateway:
//! - Corpus store and data loading
//! - Token-overlap retrieval
//! - Prompt templates
//! - Generation backends (hosted, local and mock)
//! - Comparison orchestration
//! - Error types, configuration and metrics

pub mod compare;
pub mod config;
pub mod corpus;
pub mod errors;
pub mod llm;
pub mod metrics;
pub mod prompts;
pub mod retrieval;

// Re-export commonly used types
pub use compare::{ComparedAnswer, Comparator, ComparisonResult};
pub use config::AppConfig;
pub use corpus::{ContextItem, CorpusStore, PrecomputedEntry};
pub use errors::{AppError, Result};
pub use llm::{select_backend, Backend, BackendError, GenerationResult, Generator};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Question used when a request is blank and no demo questions are loaded
pub const FALLBACK_QUESTION: &str = "What is wisdom?";
