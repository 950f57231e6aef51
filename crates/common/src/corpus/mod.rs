//! Corpus store
//!
//! Loads the curated context items, the precomputed demo answers and the
//! demo question list once at startup. Every loader degrades to an empty
//! (or default) collection instead of failing, so the demo always starts.

mod models;

pub use models::{ContextItem, PrecomputedEntry};

use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::DataConfig;

/// Questions offered when no question file is available
pub const DEFAULT_QUESTIONS: &[&str] = &[
    "When should an AI say 'I don't know' instead of giving a partial answer?",
    "Why is it dangerous to act confident when you're actually uncertain?",
    "How can a person stay honest when telling the full truth might hurt them?",
    "What does it mean to be humble about what you know?",
    "How should a system respond when the evidence is incomplete or conflicting?",
];

/// Immutable bundle of everything loaded at startup
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    pub items: Vec<ContextItem>,
    pub precomputed: Vec<PrecomputedEntry>,
    pub questions: Vec<String>,
    pub pack_name: String,
}

impl CorpusStore {
    /// Load all data files named by the configuration
    pub fn load(config: &DataConfig) -> Self {
        let store = Self {
            items: load(&config.corpus_path),
            precomputed: load_precomputed(&config.precomputed_path),
            questions: load_questions(&config.questions_path),
            pack_name: config.pack_name.clone(),
        };

        info!(
            pack = %store.pack_name,
            nodes = store.items.len(),
            precomputed = store.precomputed.len(),
            questions = store.questions.len(),
            "Corpus store ready"
        );
        store
    }

    /// Build a store from in-memory collections
    pub fn new(items: Vec<ContextItem>, precomputed: Vec<PrecomputedEntry>) -> Self {
        Self {
            items,
            precomputed,
            questions: DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            pack_name: String::new(),
        }
    }
}

/// Load context items from a line-delimited JSON file.
///
/// Blank lines, lines that are not valid JSON and records that are not
/// objects are skipped. A missing file yields an empty corpus.
pub fn load(path: &Path) -> Vec<ContextItem> {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corpus file not available");
            return Vec::new();
        }
    };

    let mut items = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                skipped += 1;
                debug!(line = line_no + 1, error = %e, "Skipping unreadable corpus line");
                continue;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parsed = serde_json::from_str::<Value>(line)
            .ok()
            .and_then(|v| ContextItem::from_value(&v));
        match parsed {
            Some(item) => items.push(item),
            None => {
                skipped += 1;
                debug!(line = line_no + 1, "Skipping malformed corpus line");
            }
        }
    }

    info!(path = %path.display(), loaded = items.len(), skipped, "Loaded wisdom nodes");
    items
}

/// Load precomputed answers stored as an object of objects or an array
pub fn load_precomputed(path: &Path) -> Vec<PrecomputedEntry> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "No precomputed answers available");
            return Vec::new();
        }
    };

    let data: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Error parsing precomputed answers");
            return Vec::new();
        }
    };

    let shape = if data.is_object() { "dict" } else { "list" };
    let Some(values) = models::flatten_entries(data) else {
        warn!(path = %path.display(), "Precomputed answers have unexpected format");
        return Vec::new();
    };

    let entries: Vec<PrecomputedEntry> = values
        .iter()
        .filter_map(PrecomputedEntry::from_value)
        .collect();

    info!(path = %path.display(), loaded = entries.len(), form = shape, "Loaded precomputed answers");
    entries
}

/// Load the demo question list, falling back to [`DEFAULT_QUESTIONS`]
pub fn load_questions(path: &Path) -> Vec<String> {
    let questions = match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(data) => data
                .get("questions")
                .and_then(Value::as_array)
                .map(|qs| {
                    qs.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Error loading questions");
                Vec::new()
            }
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Question file not available");
            Vec::new()
        }
    };

    if questions.is_empty() {
        return DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect();
    }
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let file = write_temp(concat!(
            "{\"core_insight\":\"honesty matters\",\"evidence\":[\"case A\"],\"source_uri\":\"doc1\"}\n",
            "this is not json\n",
            "\n",
            "{\"core_insight\":\"humility\",\"evidence\":\"case B\"}\n",
            "[1, 2, 3]\n",
            "{\"core_insight\":\"patience\"}\n",
        ));

        let items = load(file.path());
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].source, "doc1");
        assert_eq!(items[1].evidence, vec!["case B".to_string()]);
        assert!(items[2].evidence.is_empty());
    }

    #[test]
    fn test_load_continues_past_invalid_utf8() {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(b"{\"core_insight\":\"one\"}\n").expect("write");
        file.write_all(b"{\"core_insight\":\"\xff\xfe\"}\n").expect("write");
        file.write_all(b"{\"core_insight\":\"three\"}\n{\"core_insight\":\"four\"}\n")
            .expect("write");

        let insights: Vec<String> = load(file.path()).into_iter().map(|i| i.insight).collect();
        assert_eq!(insights, vec!["one", "three", "four"]);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let items = load(Path::new("/definitely/not/here.jsonl"));
        assert!(items.is_empty());
    }

    #[test]
    fn test_load_precomputed_list_form() {
        let file = write_temp(
            r#"[{"question":"what is wisdom","baseline":"B","ads":"A","context_bullets":["x"]}]"#,
        );
        let entries = load_precomputed(file.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].baseline, "B");
        assert_eq!(entries[0].context_bullets, vec!["x".to_string()]);
    }

    #[test]
    fn test_load_precomputed_dict_form_drops_non_objects() {
        let file = write_temp(
            r#"{"q1":{"question":"one","baseline":"b1","ads":"a1"},"note":"ignored","q2":{"question":"two"}}"#,
        );
        let entries = load_precomputed(file.path());
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.question == "one"));
        assert!(entries.iter().any(|e| e.question == "two"));
    }

    #[test]
    fn test_load_precomputed_bad_shapes_are_empty() {
        assert!(load_precomputed(write_temp("\"just a string\"").path()).is_empty());
        assert!(load_precomputed(write_temp("{not json").path()).is_empty());
        assert!(load_precomputed(Path::new("/missing/precomputed.json")).is_empty());
    }

    #[test]
    fn test_load_questions_with_fallback() {
        let file = write_temp(r#"{"questions":["What is courage?"]}"#);
        assert_eq!(load_questions(file.path()), vec!["What is courage?".to_string()]);

        let empty = write_temp(r#"{"questions":[]}"#);
        assert_eq!(load_questions(empty.path()).len(), DEFAULT_QUESTIONS.len());
        assert_eq!(
            load_questions(Path::new("/missing/questions.json")).len(),
            DEFAULT_QUESTIONS.len()
        );
    }

    #[test]
    fn test_store_load_with_missing_files() {
        let config = DataConfig {
            corpus_path: "/missing/nodes.jsonl".into(),
            questions_path: "/missing/questions.json".into(),
            precomputed_path: "/missing/precomputed.json".into(),
            pack_name: "Empty".to_string(),
        };
        let store = CorpusStore::load(&config);
        assert!(store.items.is_empty());
        assert!(store.precomputed.is_empty());
        assert_eq!(store.questions.len(), DEFAULT_QUESTIONS.len());
        assert_eq!(store.pack_name, "Empty");
    }
}
