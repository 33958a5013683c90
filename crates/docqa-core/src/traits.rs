//! Core traits for docqa components.
//!
//! - [`TextExtractor`]: Turn uploaded document bytes into text
//! - [`Chunker`]: Split text into overlapping chunks
//! - [`EmbeddingProvider`]: Map text to vectors
//! - [`AnswerGenerator`]: Produce an answer from a system and user prompt
//!
//! The network-backed implementations live in their own crates; tests swap in
//! deterministic stubs.

use async_trait::async_trait;

use crate::error::{ChunkError, EmbedError, ExtractError, GenerateError};
use crate::types::{ChunkConfig, ChunkOutput, EmbeddingConfig, ExtractedContent, GenerationConfig};

// ============================================================================
// Content Extraction
// ============================================================================

/// Trait for extracting text from uploaded documents.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns the MIME types this extractor can handle.
    fn supported_types(&self) -> &[&str];

    /// Extract text from document bytes.
    async fn extract_bytes(&self, data: &[u8]) -> Result<ExtractedContent, ExtractError>;
}

// ============================================================================
// Chunking
// ============================================================================

/// Trait for splitting text into chunks.
#[async_trait]
pub trait Chunker: Send + Sync {
    /// Name of this chunking strategy.
    fn name(&self) -> &str;

    /// Chunk the text. Fails with [`ChunkError::EmptyInput`] on blank text.
    async fn chunk(&self, text: &str, config: &ChunkConfig)
        -> Result<Vec<ChunkOutput>, ChunkError>;
}

// ============================================================================
// Embedding
// ============================================================================

/// Trait for generating embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Embed a batch of texts, one vector per input in input order.
    async fn embed_text(
        &self,
        texts: &[&str],
        config: &EmbeddingConfig,
    ) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a query.
    async fn embed_query(
        &self,
        query: &str,
        config: &EmbeddingConfig,
    ) -> Result<Vec<f32>, EmbedError> {
        let results = self.embed_text(&[query], config).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::InvalidResponse("empty embedding result".to_string()))
    }
}

// ============================================================================
// Answer Generation
// ============================================================================

/// Trait for chat-style answer generation.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Complete a conversation made of one system and one user message.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        config: &GenerationConfig,
    ) -> Result<String, GenerateError>;
}
