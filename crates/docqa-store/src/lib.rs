//! Document index for docqa.
//!
//! [`DocumentIndex`] keeps the embedded chunks of the most recently uploaded
//! document in memory and answers top-k cosine similarity queries against
//! them. There is no persistence; an upload replaces the index wholesale.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_store::DocumentIndex;
//! use docqa_embed::{EmbedderPool, HashEmbedder};
//! use std::sync::Arc;
//!
//! let pool = Arc::new(EmbedderPool::new(Arc::new(HashEmbedder::new()), 4));
//! let index = DocumentIndex::new(pool, Default::default()).with_max_chunks(500);
//!
//! index.build(chunks).await?;
//! let results = index.query("What color is the sky?", 4).await?;
//! ```

pub mod index;

pub use index::{DocumentIndex, DEFAULT_MAX_CHUNKS};
