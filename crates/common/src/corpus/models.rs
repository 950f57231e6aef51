//! Corpus record types and their JSON normalization

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One curated knowledge snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    /// Core insight (`core_insight`)
    pub insight: String,

    /// Ethical reflection (`ethical_reflection`)
    pub reflection: String,

    /// Source identifier (`source_uri`, falling back to `source`)
    pub source: String,

    /// Supporting evidence, always a list after normalization
    pub evidence: Vec<String>,
}

impl ContextItem {
    /// Build an item from one parsed corpus record.
    ///
    /// Returns `None` when the record is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let source = match obj.get("source_uri") {
            Some(v) if !v.is_null() => text_of(Some(v)),
            _ => text_of(obj.get("source")),
        };

        Some(Self {
            insight: text_of(obj.get("core_insight")),
            reflection: text_of(obj.get("ethical_reflection")),
            source,
            evidence: evidence_of(obj.get("evidence")),
        })
    }

    /// Text the retriever tokenizes: insight and reflection joined by a space
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.insight, self.reflection)
    }
}

/// A stored question with baseline and augmented answers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrecomputedEntry {
    pub question: String,
    pub baseline: String,
    pub ads: String,
    pub context_bullets: Vec<String>,
}

impl PrecomputedEntry {
    /// Build an entry from one stored object; non-objects yield `None`
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            question: text_of(obj.get("question")),
            baseline: text_of(obj.get("baseline")),
            ads: text_of(obj.get("ads")),
            context_bullets: evidence_of(obj.get("context_bullets")),
        })
    }
}

/// Stringify a scalar field. Missing and null become empty.
fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Normalize a string, list, null or missing field into a list
fn evidence_of(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(|v| text_of(Some(v))).collect(),
        Some(single) => vec![text_of(Some(single))],
    }
}

/// Flatten either precomputed shape into its entry objects
pub(crate) fn flatten_entries(data: Value) -> Option<Vec<Value>> {
    match data {
        Value::Object(map) => Some(object_values(map)),
        Value::Array(items) => Some(items),
        _ => None,
    }
}

fn object_values(map: Map<String, Value>) -> Vec<Value> {
    map.into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_evidence_string_becomes_list() {
        let item = ContextItem::from_value(&json!({
            "core_insight": "a",
            "evidence": "single case"
        }))
        .unwrap();
        assert_eq!(item.evidence, vec!["single case".to_string()]);
    }

    #[test]
    fn test_evidence_missing_or_null_becomes_empty() {
        let missing = ContextItem::from_value(&json!({"core_insight": "a"})).unwrap();
        let null = ContextItem::from_value(&json!({"core_insight": "a", "evidence": null})).unwrap();
        assert!(missing.evidence.is_empty());
        assert!(null.evidence.is_empty());
    }

    #[test]
    fn test_source_falls_back_to_source_key() {
        let item = ContextItem::from_value(&json!({"source": "doc2"})).unwrap();
        assert_eq!(item.source, "doc2");

        let both = ContextItem::from_value(&json!({"source_uri": "doc1", "source": "doc2"})).unwrap();
        assert_eq!(both.source, "doc1");
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(ContextItem::from_value(&json!(42)).is_none());
        assert!(PrecomputedEntry::from_value(&json!(["q"])).is_none());
    }

    #[test]
    fn test_numeric_fields_are_stringified() {
        let item = ContextItem::from_value(&json!({"core_insight": 7, "evidence": [1, "two"]})).unwrap();
        assert_eq!(item.insight, "7");
        assert_eq!(item.evidence, vec!["1".to_string(), "two".to_string()]);
    }
}
