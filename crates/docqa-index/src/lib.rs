//! Document indexing pipeline for docqa.
//!
//! This crate runs an uploaded document through:
//! extraction → chunking → embedding → index swap.
//!
//! # Components
//!
//! - [`DocumentIndexer`]: Coordinates the pipeline for one upload
//! - [`IndexerConfig`]: Configuration for the indexer
//! - [`IndexUpdate`]: Events emitted during indexing
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_index::{DocumentIndexer, IndexerConfig, IndexUpdate};
//!
//! let indexer = DocumentIndexer::new(extractor, chunker, index, IndexerConfig::default());
//!
//! let mut updates = indexer.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(update) = updates.recv().await {
//!         if let IndexUpdate::DocumentIndexed { chunk_count, .. } = update {
//!             println!("indexed {chunk_count} chunks");
//!         }
//!     }
//! });
//!
//! let chunks = indexer.index_document(&pdf_bytes).await?;
//! ```

pub mod indexer;

pub use indexer::{DocumentIndexer, IndexUpdate, IndexerConfig};
