//! # docqa-core
//!
//! Core types and traits for docqa, a service that answers questions about
//! an uploaded PDF using retrieval-augmented generation.
//!
//! ## Architecture
//!
//! ```text
//! PDF bytes → TextExtractor → Chunker → EmbeddingProvider → DocumentIndex
//!                                                               ↓
//!                       question → DocumentIndex::query → AnswerGenerator
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ExtractedContent`] | Text extracted from a document |
//! | [`ChunkOutput`] | A positioned segment produced by a chunker |
//! | [`Chunk`] | A segment with its embedding |
//! | [`SearchResult`] | A retrieved chunk with similarity score |
//! | [`Answer`] | Generated answer with its sources |
//!
//! ## Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`TextExtractor`] | Extract text from document bytes |
//! | [`Chunker`] | Split text into overlapping chunks |
//! | [`EmbeddingProvider`] | Generate vector embeddings |
//! | [`AnswerGenerator`] | Generate a grounded answer |
//!
//! ## Related Crates
//!
//! - `docqa-extract`: PDF text extraction
//! - `docqa-chunker`: Character chunking with overlap
//! - `docqa-embed`: Hugging Face and hash embedders, concurrency pool
//! - `docqa-generate`: Hugging Face chat completion
//! - `docqa-store`: In-memory document index
//! - `docqa-index`: Upload-to-index pipeline
//! - `docqa-query`: Question answering orchestration

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    ChunkError, EmbedError, Error, ErrorKind, ExtractError, GenerateError, IndexError, Result,
};
pub use traits::*;
pub use types::*;
