//! # docqa-embed
//!
//! Embedding providers for docqa.
//!
//! ## Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HuggingFaceEmbedder`] | Hugging Face Inference API `feature-extraction` pipeline |
//! | [`HashEmbedder`] | Deterministic feature hashing, no network access |
//! | [`EmbedderPool`] | Batching, concurrency limit and per-call timeout |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docqa_embed::{EmbedderPool, HuggingFaceEmbedder};
//! use docqa_core::EmbeddingConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let embedder = HuggingFaceEmbedder::new(
//!     "sentence-transformers/all-MiniLM-L6-v2",
//!     std::env::var("HUGGINGFACEHUB_API_KEY").ok(),
//! );
//! let pool = EmbedderPool::new(Arc::new(embedder), 4)
//!     .with_timeout(Duration::from_secs(30));
//!
//! let texts = vec!["Hello world".to_string(), "Machine learning".to_string()];
//! let vectors = pool.embed_documents(&texts, &EmbeddingConfig::default()).await?;
//! ```

pub mod hash;
pub mod huggingface;
pub mod pool;

pub use hash::HashEmbedder;
pub use huggingface::HuggingFaceEmbedder;
pub use pool::EmbedderPool;
