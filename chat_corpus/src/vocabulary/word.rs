//! Word definitions - entries of the vocabulary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::log::MessageId;

/// A learned word.
///
/// The occurrence set only ever grows; words are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Normalized text of the word.
    pub text: String,

    /// Ids of the messages this word occurs in.
    #[serde(default)]
    pub mids: BTreeSet<MessageId>,

    /// Nickname of whoever taught the word, empty if unknown.
    #[serde(default)]
    pub author: String,
}

impl Word {
    /// Create a word with no occurrences and no author.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: Self::normalize(text.as_ref()),
            mids: BTreeSet::new(),
            author: String::new(),
        }
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Add occurrences.
    pub fn with_mids(mut self, mids: impl IntoIterator<Item = MessageId>) -> Self {
        self.mids.extend(mids);
        self
    }

    /// Number of messages the word occurs in.
    pub fn occurrence_count(&self) -> usize {
        self.mids.len()
    }

    /// Record that the word occurs in a message. Returns false if already recorded.
    pub fn add_occurrence(&mut self, mid: MessageId) -> bool {
        self.mids.insert(mid)
    }

    /// Normalize raw text into the form words are stored under.
    pub fn normalize(text: &str) -> String {
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_creation() {
        let word = Word::new("  猫  ");
        assert_eq!(word.text, "猫");
        assert_eq!(word.occurrence_count(), 0);
        assert!(word.author.is_empty());
    }

    #[test]
    fn test_word_builder() {
        let word = Word::new("ラーメン").with_author("alice").with_mids([3, 1, 3]);
        assert_eq!(word.author, "alice");
        assert_eq!(word.occurrence_count(), 2);
    }

    #[test]
    fn test_occurrences_only_grow() {
        let mut word = Word::new("ラーメン");
        assert!(word.add_occurrence(4));
        assert!(!word.add_occurrence(4));
        assert!(word.add_occurrence(2));
        assert_eq!(word.mids.iter().copied().collect::<Vec<_>>(), vec![2, 4]);
    }
}
