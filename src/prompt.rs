//! Prompt assembly.
//!
//! Renders retrieved context and the user question into a single
//! instruction-augmented prompt. No truncation, deduplication, or relevance
//! filtering happens here; if the accumulated context exceeds the model's
//! input limit, the generation call fails, not this step.

/// Build the generation prompt from the query and the retrieved chunk
/// contents, newline-joined in store order. An empty chunk list still
/// produces a valid prompt with an empty context section.
pub fn build_prompt(query: &str, chunks: &[String]) -> String {
    let context = chunks.join("\n");
    format!(
        "Based on the following information, answer the question:\n\n{}\n\nQuestion: {}",
        context, query
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_template() {
        let chunks = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            build_prompt("q", &chunks),
            "Based on the following information, answer the question:\n\na\nb\n\nQuestion: q"
        );
    }

    #[test]
    fn empty_context_still_renders() {
        assert_eq!(
            build_prompt("q", &[]),
            "Based on the following information, answer the question:\n\n\n\nQuestion: q"
        );
    }

    #[test]
    fn deterministic_for_fixed_chunk_order() {
        let chunks = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        assert_eq!(build_prompt("q", &chunks), build_prompt("q", &chunks));
    }

    #[test]
    fn query_text_is_not_normalized() {
        let prompt = build_prompt("  Mixed Case?  ", &[]);
        assert!(prompt.ends_with("Question:   Mixed Case?  "));
    }
}
