//! Error types for docqa.
//!
//! Each pipeline stage has its own error enum; [`Error`] wraps them at the
//! service boundary. [`Error::kind`] classifies any error into the small
//! taxonomy the HTTP layer maps onto status codes.

use std::time::Duration;
use thiserror::Error;

/// Main error type for docqa operations.
///
/// The `Display` text of the request-level variants is the exact message
/// returned to HTTP clients.
#[derive(Error, Debug)]
pub enum Error {
    /// Upload request carried no file
    #[error("No file uploaded.")]
    NoFile,

    /// The document contained no extractable text
    #[error("No textual content found in PDF.")]
    NoText,

    /// Question was missing, empty or whitespace-only
    #[error("Missing 'question'.")]
    InvalidQuestion,

    /// Query issued before any successful build
    #[error("No index yet. Upload a PDF first.")]
    NotIndexed,

    /// A configured resource limit was exceeded
    #[error("{0}")]
    LimitExceeded(String),

    /// Content extraction failed
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Chunking failed
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkError),

    /// Embedding provider failed
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),

    /// Answer generator failed
    #[error("generation error: {0}")]
    Generation(#[from] GenerateError),

    /// Document index operation failed
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request input (missing file, unparseable PDF, no text)
    InvalidInput,
    /// Empty or missing question
    InvalidQuestion,
    /// No index has been built yet
    NotIndexed,
    /// Upload or chunk limit exceeded
    LimitExceeded,
    /// Embedding or generation provider failed
    Provider,
    /// A provider call exceeded its time budget
    Timeout,
    /// Anything else
    Internal,
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFile | Self::NoText => ErrorKind::InvalidInput,
            Self::InvalidQuestion => ErrorKind::InvalidQuestion,
            Self::NotIndexed => ErrorKind::NotIndexed,
            Self::LimitExceeded(_) => ErrorKind::LimitExceeded,
            Self::Extraction(e) => match e {
                ExtractError::Parse(_) => ErrorKind::InvalidInput,
                ExtractError::Failed(_) => ErrorKind::Internal,
            },
            Self::Chunking(e) => match e {
                ChunkError::EmptyInput => ErrorKind::InvalidInput,
                ChunkError::InvalidConfig(_) => ErrorKind::Internal,
            },
            Self::Embedding(e) => e.kind(),
            Self::Generation(e) => e.kind(),
            Self::Index(e) => match e {
                IndexError::NotIndexed => ErrorKind::NotIndexed,
                IndexError::TooManyChunks { .. } => ErrorKind::LimitExceeded,
                IndexError::Embedding(e) => e.kind(),
                IndexError::EmbeddingCountMismatch { .. } => ErrorKind::Provider,
            },
        }
    }

    /// Whether this error is a provider timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}

/// Content extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Chunking errors.
#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Embedding provider errors.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("provider returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding request timed out after {0:?}")]
    Timeout(Duration),
}

impl EmbedError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout(_) => ErrorKind::Timeout,
            _ => ErrorKind::Provider,
        }
    }
}

/// Answer generator errors.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("provider returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("generation request timed out after {0:?}")]
    Timeout(Duration),
}

impl GenerateError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout(_) => ErrorKind::Timeout,
            _ => ErrorKind::Provider,
        }
    }
}

/// Document index errors.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("No index yet. Upload a PDF first.")]
    NotIndexed,

    #[error("document produced {count} chunks, limit is {max}")]
    TooManyChunks { count: usize, max: usize },

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),

    #[error("provider returned {embeddings} embeddings for {chunks} chunks")]
    EmbeddingCountMismatch { chunks: usize, embeddings: usize },
}

/// Result type alias for docqa operations.
pub type Result<T> = std::result::Result<T, Error>;
