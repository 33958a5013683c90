//! In-memory document index.
//!
//! The index holds at most one snapshot: the chunks of the last successful
//! upload with their embeddings. A build embeds everything before touching
//! the shared state and installs the result with a single swap, so readers
//! see either the previous snapshot or the new one. Concurrent builds are
//! last-writer-wins.

use chrono::{DateTime, Utc};
use docqa_core::{
    Chunk, ChunkOutput, EmbedError, EmbeddingConfig, IndexError, IndexStats, SearchResult,
};
use docqa_embed::EmbedderPool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Default upper bound on chunks per document.
pub const DEFAULT_MAX_CHUNKS: usize = 2000;

/// An immutable, fully embedded index build.
#[derive(Debug)]
struct Snapshot {
    id: Uuid,
    built_at: DateTime<Utc>,
    model: String,
    dimension: usize,
    chunks: Vec<Chunk>,
}

/// Vector index over the chunks of the current document.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_store::DocumentIndex;
///
/// let index = DocumentIndex::new(pool, EmbeddingConfig::default());
/// let count = index.build(chunks).await?;
/// let hits = index.query("What color is the sky?", 4).await?;
/// ```
pub struct DocumentIndex {
    pool: Arc<EmbedderPool>,
    embedding_config: EmbeddingConfig,
    max_chunks: usize,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl DocumentIndex {
    /// Create an empty index that embeds through `pool`.
    pub fn new(pool: Arc<EmbedderPool>, embedding_config: EmbeddingConfig) -> Self {
        Self {
            pool,
            embedding_config,
            max_chunks: DEFAULT_MAX_CHUNKS,
            current: RwLock::new(None),
        }
    }

    /// Set the maximum number of chunks accepted by [`build`](Self::build).
    #[must_use]
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Maximum number of chunks accepted by a build.
    pub fn max_chunks(&self) -> usize {
        self.max_chunks
    }

    /// Embed `chunks` and replace the current index with them.
    ///
    /// On error the previous index, if any, stays installed.
    pub async fn build(&self, chunks: Vec<ChunkOutput>) -> Result<usize, IndexError> {
        if chunks.len() > self.max_chunks {
            return Err(IndexError::TooManyChunks {
                count: chunks.len(),
                max: self.max_chunks,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self
            .pool
            .embed_documents(&texts, &self.embedding_config)
            .await?;

        if vectors.len() != chunks.len() {
            return Err(IndexError::EmbeddingCountMismatch {
                chunks: chunks.len(),
                embeddings: vectors.len(),
            });
        }

        let dimension = vectors.first().map_or(0, Vec::len);
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(EmbedError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            }
            .into());
        }

        let stored: Vec<Chunk> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(c, embedding)| Chunk {
                position: c.position,
                content: c.content,
                char_range: c.char_range,
                embedding,
            })
            .collect();
        let count = stored.len();

        let snapshot = Arc::new(Snapshot {
            id: Uuid::new_v4(),
            built_at: Utc::now(),
            model: self.pool.model_name().to_string(),
            dimension,
            chunks: stored,
        });
        let id = snapshot.id;

        *self.current.write().await = Some(snapshot);

        info!("Installed index {} with {} chunks (dim {})", id, count, dimension);
        Ok(count)
    }

    /// Return the `k` chunks most similar to `text`.
    ///
    /// Results are ordered by descending cosine similarity, ties by ascending
    /// chunk position.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchResult>, IndexError> {
        self.retrieve(text, k).await.map(|(results, _)| results)
    }

    /// Like [`query`](Self::query), also returning the chunk count of the
    /// snapshot that answered.
    pub async fn retrieve(
        &self,
        text: &str,
        k: usize,
    ) -> Result<(Vec<SearchResult>, usize), IndexError> {
        // Release the lock before the embedding call
        let snapshot = self
            .current
            .read()
            .await
            .clone()
            .ok_or(IndexError::NotIndexed)?;

        let query_vector = self
            .pool
            .embed_query(text, &self.embedding_config)
            .await?;

        if query_vector.len() != snapshot.dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: snapshot.dimension,
                actual: query_vector.len(),
            }
            .into());
        }

        let mut scored: Vec<(f32, &Chunk)> = snapshot
            .chunks
            .iter()
            .map(|chunk| (cosine_similarity(&query_vector, &chunk.embedding), chunk))
            .collect();

        scored.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| a.1.position.cmp(&b.1.position))
        });

        let results: Vec<SearchResult> = scored
            .into_iter()
            .take(k)
            .map(|(score, chunk)| SearchResult {
                position: chunk.position,
                content: chunk.content.clone(),
                score,
            })
            .collect();

        debug!(
            "Query matched {} of {} chunks in index {}",
            results.len(),
            snapshot.chunks.len(),
            snapshot.id
        );
        Ok((results, snapshot.chunks.len()))
    }

    /// Whether a build has completed.
    pub async fn is_indexed(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Chunk count of the installed index, 0 when none.
    pub async fn chunk_count(&self) -> usize {
        self.current
            .read()
            .await
            .as_ref()
            .map_or(0, |s| s.chunks.len())
    }

    /// Describe the installed index.
    pub async fn stats(&self) -> IndexStats {
        match self.current.read().await.as_ref() {
            Some(s) => IndexStats {
                indexed: true,
                total_chunks: s.chunks.len(),
                index_id: Some(s.id),
                built_at: Some(s.built_at),
                embedding_model: Some(s.model.clone()),
            },
            None => IndexStats::default(),
        }
    }
}

/// Cosine similarity; 0 for mismatched lengths or zero vectors. Undefined
/// scores from non-finite components rank below everything else.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a * norm_b);
    if score.is_nan() {
        f32::NEG_INFINITY
    } else if score == 0.0 {
        // -0.0 and 0.0 must tie under total_cmp
        0.0
    } else {
        score
    }
}
