//! Thought traces - one record per reply explaining how it was chosen.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chat_corpus::MessageId;

/// Which step of the reply cascade produced an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Similar message with new words substituted in.
    SimilarSubstitution = 1,
    /// Message sharing a new word, used verbatim.
    KeywordVerbatim = 2,
    /// Similar message used as is.
    SimilarVerbatim = 3,
    /// Message sharing any remembered word, used verbatim.
    KeywordRecall = 4,
}

impl Strategy {
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A single trace line.
#[derive(Debug, Clone, PartialEq)]
pub struct ThoughtRecord {
    /// Index of the newest log message when the reply was made.
    pub log_position: Option<MessageId>,
    pub strategy: Strategy,
    pub similar_id: Option<MessageId>,
    pub response_id: Option<MessageId>,
    pub words: Vec<String>,
    pub output: String,
}

impl fmt::Display for ThoughtRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn id(value: Option<MessageId>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            id(self.log_position),
            self.strategy.tag(),
            id(self.similar_id),
            id(self.response_id),
            self.words.join(","),
            self.output
        )
    }
}

/// Appends thought records to a file.
///
/// Write failures are logged and otherwise ignored.
#[derive(Debug, Default)]
pub struct ThoughtRecorder {
    file: Option<File>,
}

impl ThoughtRecorder {
    /// Open (or create) a trace file for appending.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self { file: Some(file) },
            Err(e) => {
                tracing::warn!("Cannot open thought trace {}: {}", path.display(), e);
                Self::disabled()
            }
        }
    }

    /// A recorder that drops every record.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn record(&mut self, record: &ThoughtRecord) {
        tracing::debug!(strategy = record.strategy.tag(), "{}", record.output);
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = writeln!(file, "{}", record) {
                tracing::warn!("Failed to write thought trace: {}", e);
            }
        }
    }
}
