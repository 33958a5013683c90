//! Core types for docqa.
//!
//! ## Extraction
//! - [`ExtractedContent`]: Plain text pulled out of an uploaded document
//!
//! ## Chunks
//! - [`ChunkConfig`]: Size and overlap for splitting
//! - [`ChunkOutput`]: A positioned segment produced by a chunker
//! - [`Chunk`]: A segment together with its embedding, owned by the index
//!
//! ## Embedding and generation
//! - [`EmbeddingConfig`]: Batching and preprocessing for embedding calls
//! - [`GenerationConfig`]: Output bounds for answer generation
//!
//! ## Retrieval
//! - [`SearchResult`]: A retrieved chunk with similarity score
//! - [`IndexStats`]: State of the document index
//! - [`Answer`]: The outcome of asking a question

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use uuid::Uuid;

/// Number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

// ============================================================================
// Extraction
// ============================================================================

/// Content extracted from a document.
#[derive(Debug, Clone, Default)]
pub struct ExtractedContent {
    /// Full text, pages in document order
    pub text: String,
    /// Page count, if the extractor knows it
    pub page_count: Option<u32>,
}

impl ExtractedContent {
    /// Whether the extracted text is empty or whitespace-only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// ============================================================================
// Chunks
// ============================================================================

/// Configuration for chunking. Both sizes count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum chunk length
    pub size: usize,
    /// Characters shared by consecutive chunks
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: 2000,
            overlap: 300,
        }
    }
}

/// Output from a chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutput {
    /// Sequence position, contiguous from 0
    pub position: u32,
    /// Chunk content
    pub content: String,
    /// Character range in the source text
    pub char_range: Range<usize>,
}

/// A chunk stored in the document index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequence position, assigned at split time
    pub position: u32,
    /// The actual content
    pub content: String,
    /// Character range in the source text
    pub char_range: Range<usize>,
    /// Embedding vector
    pub embedding: Vec<f32>,
}

// ============================================================================
// Embedding
// ============================================================================

/// Configuration for embedding calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Texts sent per provider request
    pub batch_size: usize,
    /// Replace newlines with spaces before embedding
    pub strip_newlines: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            strip_newlines: true,
        }
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Configuration for answer generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.2,
        }
    }
}

// ============================================================================
// Retrieval
// ============================================================================

/// A search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Position of the matched chunk
    pub position: u32,
    /// Chunk content
    pub content: String,
    /// Cosine similarity to the query
    pub score: f32,
}

/// Document index statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Whether an index is installed
    pub indexed: bool,
    /// Chunks in the installed index
    pub total_chunks: usize,
    /// Identifier of the installed build
    pub index_id: Option<Uuid>,
    /// When the installed index was built
    pub built_at: Option<DateTime<Utc>>,
    /// Embedding model used for the build
    pub embedding_model: Option<String>,
}

/// Answer to a question about the indexed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generator output, unmodified
    pub answer: String,
    /// Chunks used as context, in retrieval order
    pub sources: Vec<SearchResult>,
    /// Total chunks in the index that answered
    pub total_chunks: usize,
}

impl Answer {
    /// Positions of the source chunks, in retrieval order.
    #[must_use]
    pub fn source_positions(&self) -> Vec<u32> {
        self.sources.iter().map(|s| s.position).collect()
    }
}
