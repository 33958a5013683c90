//! Component wiring from configuration.

use anyhow::Result;
use docqa_chunker::CharacterChunker;
use docqa_core::{AnswerGenerator, EmbeddingProvider, TextExtractor};
use docqa_embed::{EmbedderPool, HashEmbedder, HuggingFaceEmbedder};
use docqa_extract::PdfExtractor;
use docqa_generate::HuggingFaceGenerator;
use docqa_index::{DocumentIndexer, IndexUpdate, IndexerConfig};
use docqa_query::QueryOrchestrator;
use docqa_store::DocumentIndex;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{Config, EmbeddingProviderKind, API_KEY_ENV, DOTENV_FILE};
use crate::server::AppState;

/// Create the embedding provider selected by the configuration.
pub fn create_embedder(config: &Config) -> Arc<dyn EmbeddingProvider> {
    match config.embedding.provider {
        EmbeddingProviderKind::HuggingFace => Arc::new(
            HuggingFaceEmbedder::new(config.embedding.model.clone(), config.api_key.clone())
                .with_base_url(config.embedding.base_url.clone()),
        ),
        EmbeddingProviderKind::Hash => Arc::new(HashEmbedder::new()),
    }
}

/// Create the answer generator.
pub fn create_generator(config: &Config) -> Arc<dyn AnswerGenerator> {
    Arc::new(
        HuggingFaceGenerator::new(config.generation.model.clone(), config.api_key.clone())
            .with_base_url(config.generation.base_url.clone()),
    )
}

/// Wire the full pipeline around the given collaborators.
///
/// Chunking always uses [`CharacterChunker`].
///
/// The indexer and the orchestrator share one [`DocumentIndex`].
pub fn build_state(
    config: &Config,
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn AnswerGenerator>,
) -> Result<AppState> {
    config.validate()?;

    let pool = Arc::new(
        EmbedderPool::new(embedder, config.embedding.max_concurrent)
            .with_timeout(config.embedding_timeout()),
    );
    let index = Arc::new(
        DocumentIndex::new(pool, config.embedding_call_config())
            .with_max_chunks(config.index.max_chunks),
    );

    let indexer = Arc::new(DocumentIndexer::new(
        extractor,
        Arc::new(CharacterChunker::new()),
        Arc::clone(&index),
        IndexerConfig {
            chunk_config: config.chunk_config(),
        },
    ));

    let orchestrator = Arc::new(
        QueryOrchestrator::new(index, generator)
            .with_top_k(config.index.top_k)
            .with_generation_config(config.generation_call_config())
            .with_timeout(config.generation_timeout()),
    );

    Ok(AppState::new(
        indexer,
        orchestrator,
        config.server.max_upload_bytes,
    ))
}

/// Wire the pipeline with the configured providers.
pub fn create_state(config: &Config) -> Result<AppState> {
    if config.api_key.is_none() {
        warn!(
            "Missing {API_KEY_ENV} (set it in the environment or {DOTENV_FILE}); \
             Hugging Face requests will fail."
        );
    }

    let embedder = create_embedder(config);
    let generator = create_generator(config);
    info!(
        "Using embedder {} and generator {}",
        embedder.model_name(),
        generator.model_name()
    );

    build_state(config, Arc::new(PdfExtractor::new()), embedder, generator)
}

/// Upload outcomes counted by [`spawn_update_reporter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadTotals {
    pub indexed: u64,
    pub failed: u64,
}

/// Log index updates until the indexer is dropped, then return the totals.
pub fn spawn_update_reporter(
    mut updates: broadcast::Receiver<IndexUpdate>,
) -> JoinHandle<UploadTotals> {
    tokio::spawn(async move {
        let mut totals = UploadTotals::default();
        loop {
            match updates.recv().await {
                Ok(IndexUpdate::IndexingStarted { bytes }) => {
                    debug!("Upload of {} bytes started", bytes);
                }
                Ok(IndexUpdate::DocumentIndexed {
                    index_id,
                    chunk_count,
                    ..
                }) => {
                    totals.indexed += 1;
                    info!(
                        "Serving index {} ({} chunks); {} uploads indexed, {} failed",
                        index_id.map_or_else(|| "?".to_string(), |id| id.to_string()),
                        chunk_count,
                        totals.indexed,
                        totals.failed
                    );
                }
                Ok(IndexUpdate::IndexingFailed { .. }) => {
                    totals.failed += 1;
                    debug!("{} uploads failed so far", totals.failed);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Update reporter skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        totals
    })
}
