//! Embedder pool for concurrent embedding operations.
//!
//! Document texts are split into batches of `batch_size`; batches run in
//! parallel up to `max_concurrent` in-flight requests. Every provider call
//! is bounded by the pool timeout.

use docqa_core::{EmbedError, EmbeddingConfig, EmbeddingProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Default time budget for a single provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Pool of embedding calls with concurrency and time limits.
pub struct EmbedderPool {
    embedder: Arc<dyn EmbeddingProvider>,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    timeout: Duration,
}

impl EmbedderPool {
    /// Create a new embedder pool.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            embedder,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the model name.
    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Get the underlying embedder.
    pub fn embedder(&self) -> Arc<dyn EmbeddingProvider> {
        Arc::clone(&self.embedder)
    }

    /// Embed document texts, one vector per text in input order.
    pub async fn embed_documents(
        &self,
        texts: &[String],
        config: &EmbeddingConfig,
    ) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let batch_size = config.batch_size.max(1);
        let batch_count = texts.len().div_ceil(batch_size);
        debug!(
            "Embedding {} texts in {} batches (max {} concurrent)",
            texts.len(),
            batch_count,
            self.max_concurrent
        );

        let mut tasks = JoinSet::new();
        for (index, batch) in texts.chunks(batch_size).enumerate() {
            let batch = batch.to_vec();
            let embedder = Arc::clone(&self.embedder);
            let semaphore = Arc::clone(&self.semaphore);
            let config = config.clone();
            let timeout = self.timeout;

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| EmbedError::Request(format!("semaphore error: {e}")))?;
                let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
                let vectors = tokio::time::timeout(timeout, embedder.embed_text(&refs, &config))
                    .await
                    .map_err(|_| EmbedError::Timeout(timeout))??;
                Ok::<_, EmbedError>((index, vectors))
            });
        }

        let mut batches: Vec<Option<Vec<Vec<f32>>>> = vec![None; batch_count];
        while let Some(joined) = tasks.join_next().await {
            // Returning early drops the JoinSet, which aborts the remaining batches.
            let (index, vectors) =
                joined.map_err(|e| EmbedError::Request(format!("embedding task failed: {e}")))??;
            batches[index] = Some(vectors);
        }

        Ok(batches.into_iter().flatten().flatten().collect())
    }

    /// Embed a single query.
    pub async fn embed_query(
        &self,
        query: &str,
        config: &EmbeddingConfig,
    ) -> Result<Vec<f32>, EmbedError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| EmbedError::Request(format!("semaphore error: {e}")))?;

        tokio::time::timeout(self.timeout, self.embedder.embed_query(query, config))
            .await
            .map_err(|_| EmbedError::Timeout(self.timeout))?
    }

    /// Get pool statistics.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Get max concurrent operations.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Get the per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
