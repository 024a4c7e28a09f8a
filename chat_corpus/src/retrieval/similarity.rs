//! Similarity search over the conversation log.

use std::collections::{HashMap, HashSet};

use crate::log::{LogEvent, LogObserver, MessageId, MessageLog};

/// Finds messages resembling a text.
///
/// Implementations keep themselves current by observing the log.
pub trait SimilarityIndex: LogObserver {
    /// Message ids similar to `text`, most similar first.
    ///
    /// The sequence is finite and a fresh one is produced on every call.
    fn similar_messages<'a>(&'a self, text: &str) -> Box<dyn Iterator<Item = MessageId> + 'a>;

    /// Index every message already in the log.
    fn index_log(&mut self, log: &MessageLog) {
        for message in log.iter() {
            self.on_log_event(LogEvent::Appended(message));
        }
    }
}

/// Configuration for [`BigramIndex`].
#[derive(Debug, Clone)]
pub struct BigramConfig {
    /// Minimum Dice coefficient over character bigrams.
    pub min_score: f64,

    /// Maximum number of messages returned per query.
    pub max_results: usize,
}

impl Default for BigramConfig {
    fn default() -> Self {
        Self {
            min_score: 0.3,
            max_results: 30,
        }
    }
}

/// Inverted index from character bigrams to the messages containing them.
#[derive(Debug, Default)]
pub struct BigramIndex {
    config: BigramConfig,
    postings: HashMap<(char, char), Vec<MessageId>>,
    bigram_counts: HashMap<MessageId, usize>,
}

impl BigramIndex {
    /// Create an empty index with the given configuration.
    pub fn new(config: BigramConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create an index with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(BigramConfig::default())
    }

    /// Number of indexed messages.
    pub fn len(&self) -> usize {
        self.bigram_counts.len()
    }

    /// Check if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.bigram_counts.is_empty()
    }

    fn bigrams(text: &str) -> HashSet<(char, char)> {
        let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        chars.windows(2).map(|w| (w[0], w[1])).collect()
    }
}

impl LogObserver for BigramIndex {
    fn on_log_event(&mut self, event: LogEvent<'_>) {
        match event {
            LogEvent::Appended(message) => {
                let grams = Self::bigrams(&message.body);
                if grams.is_empty() {
                    return;
                }
                self.bigram_counts.insert(message.id, grams.len());
                for gram in grams {
                    self.postings.entry(gram).or_default().push(message.id);
                }
            }
            LogEvent::Cleared => {
                self.postings.clear();
                self.bigram_counts.clear();
            }
        }
    }
}

impl SimilarityIndex for BigramIndex {
    fn similar_messages<'a>(&'a self, text: &str) -> Box<dyn Iterator<Item = MessageId> + 'a> {
        let grams = Self::bigrams(text);
        if grams.is_empty() {
            return Box::new(std::iter::empty());
        }

        let mut shared: HashMap<MessageId, usize> = HashMap::new();
        for gram in &grams {
            if let Some(ids) = self.postings.get(gram) {
                for id in ids {
                    *shared.entry(*id).or_default() += 1;
                }
            }
        }

        let mut scored: Vec<(MessageId, f64)> = shared
            .into_iter()
            .filter_map(|(id, count)| {
                let total = grams.len() + self.bigram_counts.get(&id).copied().unwrap_or(0);
                let score = 2.0 * count as f64 / total as f64;
                (score >= self.config.min_score).then_some((id, score))
            })
            .collect();

        // Most similar first; newer messages win ties.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.0.cmp(&a.0))
        });
        scored.truncate(self.config.max_results);

        Box::new(scored.into_iter().map(|(id, _)| id))
    }
}
