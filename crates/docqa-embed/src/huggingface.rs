//! Hugging Face Inference API embedder.
//!
//! Calls the `feature-extraction` pipeline of a sentence-transformers model
//! through the inference router:
//!
//! ```text
//! POST {base_url}/hf-inference/models/{model}/pipeline/feature-extraction
//! { "inputs": ["text", ...] }
//! ```
//!
//! Sentence-transformers models answer with one pooled vector per input.
//! Plain transformer models answer with one vector per token; those are
//! mean-pooled here.

use async_trait::async_trait;
use docqa_core::{EmbedError, EmbeddingConfig, EmbeddingProvider};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default inference router.
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co";

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Embedder backed by the Hugging Face Inference API.
pub struct HuggingFaceEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct FeatureRequest<'a> {
    inputs: &'a [String],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureResponse {
    Pooled(Vec<Vec<f32>>),
    Tokens(Vec<Vec<Vec<f32>>>),
}

impl HuggingFaceEmbedder {
    /// Create an embedder for `model` on the default router.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key,
        }
    }

    /// Point the embedder at another inference endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/hf-inference/models/{}/pipeline/feature-extraction",
            self.base_url, self.model
        )
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut request = self
            .client
            .post(self.endpoint())
            .json(&FeatureRequest { inputs });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbedError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: FeatureResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::InvalidResponse(e.to_string()))?;

        let vectors = match parsed {
            FeatureResponse::Pooled(vectors) => vectors,
            FeatureResponse::Tokens(per_token) => per_token.iter().map(|t| mean_pool(t)).collect(),
        };

        if vectors.len() != inputs.len() {
            return Err(EmbedError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed_text(
        &self,
        texts: &[&str],
        config: &EmbeddingConfig,
    ) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let inputs: Vec<String> = texts
            .iter()
            .map(|t| prepare(t, config.strip_newlines))
            .collect();

        let mut vectors = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(config.batch_size.max(1)) {
            debug!("Embedding batch of {} texts with {}", batch.len(), self.model);
            vectors.extend(self.embed_batch(batch).await?);
        }
        Ok(vectors)
    }
}

fn prepare(text: &str, strip_newlines: bool) -> String {
    if strip_newlines {
        text.replace('\n', " ")
    } else {
        text.to_string()
    }
}

/// Average token vectors into a single sentence vector.
fn mean_pool(tokens: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = tokens.first() else {
        return vec![];
    };
    let mut sum = vec![0.0f32; first.len()];
    for token in tokens {
        for (acc, v) in sum.iter_mut().zip(token) {
            *acc += v;
        }
    }
    let n = tokens.len() as f32;
    sum.iter_mut().for_each(|v| *v /= n);
    sum
}
