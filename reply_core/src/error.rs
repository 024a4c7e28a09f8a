//! Error types for the reply engine.

use chat_corpus::CorpusError;
use thiserror::Error;

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Corpus storage error
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// Settings file could not be parsed
    #[error("Settings error: {0}")]
    Settings(#[from] toml::de::Error),

    /// A nickname pattern from settings is not a valid regular expression
    #[error("Invalid nickname pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Built-in regular expression failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_display() {
        let source = regex::Regex::new("[abc").unwrap_err();
        let err = EngineError::InvalidPattern {
            pattern: "[abc".into(),
            source,
        };
        assert!(err.to_string().starts_with("Invalid nickname pattern '[abc'"));
    }

    #[test]
    fn test_corpus_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: EngineError = CorpusError::from(io_err).into();
        assert!(matches!(err, EngineError::Corpus(_)));
    }
}
