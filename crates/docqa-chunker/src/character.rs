//! Character chunking with exact overlap.
//!
//! Chunks are windows of at most `size` characters. Each window ends at the
//! best boundary found in its tail (paragraph, line, sentence, whitespace,
//! in that order) and the next window starts exactly `overlap` characters
//! before that end, so dropping the first `overlap` characters of every
//! chunk after the first reconstructs the input.

use async_trait::async_trait;
use docqa_core::{ChunkConfig, ChunkError, ChunkOutput, Chunker};
use tracing::debug;

/// Character chunker with configurable overlap.
pub struct CharacterChunker;

impl CharacterChunker {
    /// Create a new character chunker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for CharacterChunker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Chunker for CharacterChunker {
    fn name(&self) -> &str {
        "character"
    }

    async fn chunk(
        &self,
        text: &str,
        config: &ChunkConfig,
    ) -> Result<Vec<ChunkOutput>, ChunkError> {
        split_text(text, config)
    }
}

/// Split `text` into overlapping chunks.
pub fn split_text(text: &str, config: &ChunkConfig) -> Result<Vec<ChunkOutput>, ChunkError> {
    validate(config)?;
    if text.trim().is_empty() {
        return Err(ChunkError::EmptyInput);
    }

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let target_end = (start + config.size).min(total);
        // Every window must reach past the overlap, or the next start would not advance.
        let end = find_break_point(&chars, start + config.overlap + 1, target_end, total);

        chunks.push(ChunkOutput {
            position: u32::try_from(chunks.len()).unwrap_or(u32::MAX),
            content: chars[start..end].iter().collect(),
            char_range: start..end,
        });

        if end >= total {
            break;
        }
        start = end - config.overlap;
    }

    debug!(
        "Split {} chars into {} chunks (size={}, overlap={})",
        total,
        chunks.len(),
        config.size,
        config.overlap
    );
    Ok(chunks)
}

fn validate(config: &ChunkConfig) -> Result<(), ChunkError> {
    if config.size == 0 {
        return Err(ChunkError::InvalidConfig("size must be > 0".to_string()));
    }
    if config.overlap >= config.size {
        return Err(ChunkError::InvalidConfig(format!(
            "overlap ({}) must be smaller than size ({})",
            config.overlap, config.size
        )));
    }
    Ok(())
}

/// Find a chunk end in `min_end..=target_end`, preferring natural boundaries
/// within the last fifth of the window.
fn find_break_point(chars: &[char], min_end: usize, target_end: usize, total: usize) -> usize {
    if target_end >= total {
        return total;
    }

    let window_start = min_end.saturating_sub(1);
    let search_start = target_end
        .saturating_sub((target_end - window_start) / 5)
        .max(min_end)
        .max(2);
    if search_start > target_end {
        return target_end;
    }

    // Prefer double newline (paragraph break)
    for end in (search_start..=target_end).rev() {
        if chars[end - 1] == '\n' && chars[end - 2] == '\n' {
            return end;
        }
    }

    // Then single newline
    for end in (search_start..=target_end).rev() {
        if chars[end - 1] == '\n' {
            return end;
        }
    }

    // Then whitespace following a sentence end
    for end in (search_start..=target_end).rev() {
        if chars[end - 1].is_whitespace() && matches!(chars[end - 2], '.' | '!' | '?') {
            return end;
        }
    }

    // Then any whitespace
    for end in (search_start..=target_end).rev() {
        if chars[end - 1].is_whitespace() {
            return end;
        }
    }

    // A single unbroken run: cut at the window edge
    target_end
}
