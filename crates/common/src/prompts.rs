//! Prompt templates for the two comparison variants
//!
//! Both builders are pure: identical inputs always render byte-identical
//! prompts.

use crate::corpus::ContextItem;

/// Evidence lines rendered per context item
pub const MAX_EVIDENCE_PER_ITEM: usize = 3;

/// Context section used when retrieval selected nothing
pub const NO_ITEMS_PLACEHOLDER: &str = "No prior nodes selected.";

/// Plain prompt: the question with no retrieved context
pub fn build_plain(question: &str) -> String {
    format!(
        "You are a helpful, honest assistant.\n\n\
         Answer the user's question as clearly and precisely as you can.\n\
         If you are missing key information, say so explicitly instead of guessing.\n\n\
         User question:\n{question}\n"
    )
}

/// Augmented prompt: the question plus the retrieved context items
pub fn build_augmented(question: &str, items: &[&ContextItem]) -> String {
    let blocks: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, item)| render_item(i + 1, item))
        .collect();

    let context_block = if blocks.is_empty() {
        NO_ITEMS_PLACEHOLDER.to_string()
    } else {
        blocks.join("\n\n")
    };

    format!(
        r#"You are a careful, humble assistant grounded in curated wisdom.

You will see a set of 'wisdom nodes' extracted from trusted sources. Use them to answer the user's question, but DO NOT exaggerate beyond the evidence.

Guidelines:
- Prefer to say 'I don't know' or 'the evidence is limited' over guessing.
- Explicitly cite insights from the wisdom nodes when they support your answer.
- Mention tradeoffs, limits, or counterpoints if they appear in the nodes.
- Be warm, honest, and precise.

User question:
{question}

Wisdom nodes:
{context_block}
"#
    )
}

fn render_item(index: usize, item: &ContextItem) -> String {
    let evidence = item
        .evidence
        .iter()
        .take(MAX_EVIDENCE_PER_ITEM)
        .map(|e| format!("- {e}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Node {index} - Core Insight:\n{}\n\n\
         Ethical Reflection:\n{}\n\n\
         Evidence:\n{evidence}\n\n\
         Source: {}\n",
        item.insight, item.reflection, item.source
    )
}
