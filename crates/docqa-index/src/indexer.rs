//! Document indexing service.

use docqa_core::{ChunkConfig, ChunkError, Chunker, Error, Result, TextExtractor};
use docqa_store::DocumentIndex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Index update events.
#[derive(Debug, Clone)]
pub enum IndexUpdate {
    IndexingStarted {
        bytes: usize,
    },
    DocumentIndexed {
        index_id: Option<Uuid>,
        chunk_count: usize,
        page_count: Option<u32>,
    },
    IndexingFailed {
        error: String,
    },
}

/// Configuration for the indexer.
#[derive(Debug, Clone, Default)]
pub struct IndexerConfig {
    /// Chunk configuration
    pub chunk_config: ChunkConfig,
}

/// Runs uploaded documents through extract, chunk and index build.
pub struct DocumentIndexer {
    extractor: Arc<dyn TextExtractor>,
    chunker: Arc<dyn Chunker>,
    index: Arc<DocumentIndex>,
    config: IndexerConfig,
    update_tx: broadcast::Sender<IndexUpdate>,
}

impl DocumentIndexer {
    /// Create a new indexer.
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        chunker: Arc<dyn Chunker>,
        index: Arc<DocumentIndex>,
        config: IndexerConfig,
    ) -> Self {
        let (update_tx, _) = broadcast::channel(64);
        Self {
            extractor,
            chunker,
            index,
            config,
            update_tx,
        }
    }

    /// Subscribe to index updates.
    pub fn subscribe(&self) -> broadcast::Receiver<IndexUpdate> {
        self.update_tx.subscribe()
    }

    /// The index this indexer builds into.
    pub fn index(&self) -> &Arc<DocumentIndex> {
        &self.index
    }

    /// Index a document, replacing the current index. Returns the chunk count.
    ///
    /// Any failure leaves the previously installed index untouched.
    pub async fn index_document(&self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Err(Error::NoFile);
        }

        let _ = self
            .update_tx
            .send(IndexUpdate::IndexingStarted { bytes: data.len() });

        match self.run(data).await {
            Ok((chunk_count, page_count)) => {
                let index_id = self.index.stats().await.index_id;
                info!(
                    "Indexed document: {} chunks from {} pages",
                    chunk_count,
                    page_count.map_or_else(|| "?".to_string(), |p| p.to_string())
                );
                let _ = self.update_tx.send(IndexUpdate::DocumentIndexed {
                    index_id,
                    chunk_count,
                    page_count,
                });
                Ok(chunk_count)
            }
            Err(e) => {
                warn!("Indexing failed: {}", e);
                let _ = self.update_tx.send(IndexUpdate::IndexingFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run(&self, data: &[u8]) -> Result<(usize, Option<u32>)> {
        let content = self.extractor.extract_bytes(data).await?;
        if content.is_blank() {
            return Err(Error::NoText);
        }
        debug!("Extracted {} chars", content.text.chars().count());

        let chunks = match self
            .chunker
            .chunk(&content.text, &self.config.chunk_config)
            .await
        {
            Ok(chunks) => chunks,
            Err(ChunkError::EmptyInput) => return Err(Error::NoText),
            Err(e) => return Err(e.into()),
        };
        debug!("Chunked into {} chunks with {}", chunks.len(), self.chunker.name());

        let count = self.index.build(chunks).await?;
        Ok((count, content.page_count))
    }
}
