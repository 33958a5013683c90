//! Grounding prompt and context assembly.

use docqa_core::SearchResult;

/// System instruction restricting answers to the supplied context.
pub const SYSTEM_PROMPT: &str = "You are a RAG question answering bot.\n\
You MUST answer ONLY using the text provided in CONTEXT.\n\
Never invent, never guess. If the answer is not literally in CONTEXT, reply exactly: \"I don't know\".\n\
Answer concisely.";

/// Label each retrieved chunk with its position, in retrieval order,
/// separated by a blank line.
pub fn assemble_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| format!("Chunk {}:\n{}", r.position, r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// User message carrying the question and its context.
pub fn user_prompt(question: &str, context: &str) -> String {
    format!("QUESTION: {question}\n\nCONTEXT:\n{context}\n")
}
