//! Question answering over the document index.

use docqa_core::{
    Answer, AnswerGenerator, Error, GenerateError, GenerationConfig, IndexError, Result,
    DEFAULT_TOP_K,
};
use docqa_store::DocumentIndex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::prompt::{assemble_context, user_prompt, SYSTEM_PROMPT};

/// Default time budget for one generation call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Retrieves context for a question and asks the generator to answer from it.
pub struct QueryOrchestrator {
    index: Arc<DocumentIndex>,
    generator: Arc<dyn AnswerGenerator>,
    top_k: usize,
    generation_config: GenerationConfig,
    timeout: Duration,
}

impl QueryOrchestrator {
    /// Create a new orchestrator with top-k 4 and default generation settings.
    pub fn new(index: Arc<DocumentIndex>, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self {
            index,
            generator,
            top_k: DEFAULT_TOP_K,
            generation_config: GenerationConfig::default(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Set how many chunks are retrieved per question.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Set generation bounds.
    #[must_use]
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = config;
        self
    }

    /// Set the generation timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Model name of the answer generator.
    pub fn generator_model(&self) -> &str {
        self.generator.model_name()
    }

    /// Answer `question` from the indexed document.
    ///
    /// The generator output is returned as is; grounding is enforced only
    /// through the system instruction.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(Error::InvalidQuestion);
        }

        let (results, total_chunks) = self
            .index
            .retrieve(question, self.top_k)
            .await
            .map_err(|e| match e {
                IndexError::NotIndexed => Error::NotIndexed,
                other => other.into(),
            })?;
        debug!(
            "Retrieved {} chunks for question ({} chars)",
            results.len(),
            question.len()
        );

        let context = assemble_context(&results);
        let prompt = user_prompt(question, &context);

        let answer = tokio::time::timeout(
            self.timeout,
            self.generator
                .complete(SYSTEM_PROMPT, &prompt, &self.generation_config),
        )
        .await
        .map_err(|_| GenerateError::Timeout(self.timeout))??;

        info!(
            "Answered question with {} source chunks via {}",
            results.len(),
            self.generator.model_name()
        );

        Ok(Answer {
            answer,
            sources: results,
            total_chunks,
        })
    }
}
