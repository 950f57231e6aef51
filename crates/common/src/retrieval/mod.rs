//! Token-overlap retrieval over the corpus
//!
//! Scores every context item by the number of distinct lower-cased,
//! whitespace-delimited tokens it shares with the question.
//! A simple heuristic, not a relevance ranking.

use serde::Serialize;
use std::collections::HashSet;

use crate::corpus::ContextItem;

/// Number of context items the live comparison retrieves
pub const DEFAULT_TOP_K: usize = 3;

/// Distinct lower-cased whitespace tokens of `text`
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Size of the token-set intersection
pub fn overlap(query: &HashSet<String>, text: &str) -> usize {
    tokenize(text).intersection(query).count()
}

/// One retrieved item with its raw overlap score
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedItem<'a> {
    pub item: &'a ContextItem,
    pub score: usize,
}

/// Ranked retrieval output
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievalResult<'a> {
    /// Highest overlap first; ties keep corpus order
    pub hits: Vec<RetrievedItem<'a>>,

    /// Aggregate relevance (see [`retrieve`] for how it is computed)
    pub relevance: f64,

    /// True when no item overlapped and the leading corpus items were used
    pub fallback: bool,
}

impl<'a> RetrievalResult<'a> {
    pub fn items(&self) -> Vec<&'a ContextItem> {
        self.hits.iter().map(|h| h.item).collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Retrieve up to `k` context items for `question`.
///
/// Items are stable-sorted by overlap descending and the first `k` with a
/// nonzero score are kept. When nothing overlaps, the first `k` items in
/// corpus order are returned instead so the augmented prompt is not empty.
///
/// The relevance score is the sum of the top-`k` raw scores divided by the
/// number of returned items, but only when the corpus holds at least `k`
/// items; smaller corpora report 0.
pub fn retrieve<'a>(question: &str, corpus: &'a [ContextItem], k: usize) -> RetrievalResult<'a> {
    if corpus.is_empty() || k == 0 {
        return RetrievalResult::default();
    }

    let query = tokenize(question);
    let mut scored: Vec<RetrievedItem<'a>> = corpus
        .iter()
        .map(|item| RetrievedItem {
            item,
            score: overlap(&query, &item.searchable_text()),
        })
        .collect();

    // Vec::sort_by is stable, so equal scores keep corpus order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(k);

    let top_sum: usize = scored.iter().map(|h| h.score).sum();
    let mut hits: Vec<RetrievedItem<'a>> = scored.iter().filter(|h| h.score > 0).cloned().collect();

    let fallback = hits.is_empty();
    if fallback {
        hits = scored;
    }

    let relevance = if corpus.len() >= k {
        top_sum as f64 / hits.len() as f64
    } else {
        0.0
    };

    tracing::debug!(
        hits = hits.len(),
        fallback,
        relevance,
        "Retrieved context items"
    );

    RetrievalResult {
        hits,
        relevance,
        fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(insight: &str, reflection: &str) -> ContextItem {
        ContextItem {
            insight: insight.to_string(),
            reflection: reflection.to_string(),
            source: String::new(),
            evidence: Vec::new(),
        }
    }

    #[test]
    fn test_tokenize_lowercases_and_dedups() {
        let tokens = tokenize("Know KNOW  know\tthis");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("know"));
        assert!(tokens.contains("this"));
    }

    #[test]
    fn test_example_scenario_single_item() {
        let corpus = vec![ContextItem {
            insight: "honesty matters".to_string(),
            reflection: "say I don't know".to_string(),
            source: "doc1".to_string(),
            evidence: vec!["case A".to_string()],
        }];

        let result = retrieve("when should I say I don't know", &corpus, 3);
        assert_eq!(result.len(), 1);
        assert!(result.hits[0].score >= 3);
        assert!(!result.fallback);
        // corpus smaller than k: relevance reported as zero
        assert_eq!(result.relevance, 0.0);
    }

    #[test]
    fn test_ranks_by_overlap_and_keeps_ties_in_corpus_order() {
        let corpus = vec![
            item("alpha", "nothing shared"),
            item("truth and honesty", "x"),
            item("honesty first", "y"),
            item("truth honesty trust", "z"),
        ];

        let result = retrieve("truth honesty trust", &corpus, 3);
        let insights: Vec<&str> = result.items().iter().map(|i| i.insight.as_str()).collect();
        assert_eq!(
            insights,
            vec!["truth honesty trust", "truth and honesty", "honesty first"]
        );

        let scores: Vec<usize> = result.hits.iter().map(|h| h.score).collect();
        assert_eq!(scores, vec![3, 2, 1]);
        assert!(scores.iter().all(|s| *s > 0));
        assert!((result.relevance - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_scores_are_filtered_when_something_overlaps() {
        let corpus = vec![item("courage", "a"), item("fear", "b"), item("calm", "c")];
        let result = retrieve("courage", &corpus, 3);
        assert_eq!(result.len(), 1);
        assert_eq!(result.hits[0].item.insight, "courage");
        // sum of top-3 raw scores (1) over one returned item
        assert!((result.relevance - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fallback_returns_leading_items_in_corpus_order() {
        let corpus = vec![item("one", "a"), item("two", "b"), item("three", "c"), item("four", "d")];
        let result = retrieve("unrelated question", &corpus, 3);

        assert!(result.fallback);
        assert_eq!(result.len(), 3);
        let insights: Vec<&str> = result.items().iter().map(|i| i.insight.as_str()).collect();
        assert_eq!(insights, vec!["one", "two", "three"]);
        assert_eq!(result.relevance, 0.0);
    }

    #[test]
    fn test_fallback_on_small_corpus_returns_all() {
        let corpus = vec![item("one", "a")];
        let result = retrieve("zzz", &corpus, 3);
        assert_eq!(result.len(), 1);
        assert!(result.fallback);
    }

    #[test]
    fn test_empty_corpus() {
        let result = retrieve("anything", &[], 3);
        assert!(result.is_empty());
        assert_eq!(result.relevance, 0.0);
        assert!(!result.fallback);
    }

    #[test]
    fn test_never_exceeds_k() {
        let corpus: Vec<ContextItem> = (0..10).map(|i| item(&format!("shared {i}"), "")).collect();
        for k in 0..5 {
            assert!(retrieve("shared", &corpus, k).len() <= k);
        }
    }
}
