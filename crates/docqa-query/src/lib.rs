//! Retrieval-augmented question answering for docqa.
//!
//! [`QueryOrchestrator::ask`] validates the question, retrieves the top-k
//! chunks from the [`DocumentIndex`](docqa_store::DocumentIndex), labels them
//! into a context block and hands it to an
//! [`AnswerGenerator`](docqa_core::AnswerGenerator) together with
//! [`SYSTEM_PROMPT`], which confines the answer to that context.

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::QueryOrchestrator;
pub use prompt::{assemble_context, user_prompt, SYSTEM_PROMPT};
