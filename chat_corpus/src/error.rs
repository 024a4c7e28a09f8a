//! Error types for corpus storage.

use thiserror::Error;

/// Errors raised while loading or persisting the corpus.
#[derive(Error, Debug)]
pub enum CorpusError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted record could not be interpreted.
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

/// Result type for corpus operations.
pub type CorpusResult<T> = Result<T, CorpusError>;
