//! # docqa-generate
//!
//! Answer generation for docqa through chat-completion APIs.
//!
//! [`HuggingFaceGenerator`] implements
//! [`AnswerGenerator`](docqa_core::AnswerGenerator) against the Hugging Face
//! inference router. A response without message content yields
//! [`NO_CONTENT`] rather than an error.

pub mod huggingface;

pub use huggingface::{HuggingFaceGenerator, NO_CONTENT};
