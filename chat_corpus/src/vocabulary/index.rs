//! Vocabulary - the index of every known word.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::Word;
use crate::error::CorpusResult;
use crate::log::{Message, MessageId};

/// Share of the vocabulary, counted from the most frequent word down, that
/// is treated as structural rather than content words.
const ADOPTION_PERCENTILE_DIVISOR: usize = 50;

/// All known words, kept in the order they were learned.
///
/// There is exactly one [`Word`] per normalized string.
#[derive(Debug, Default)]
pub struct Vocabulary {
    words: Vec<Word>,

    /// Index: normalized text -> position in `words`.
    index: HashMap<String, usize>,

    path: Option<PathBuf>,
}

impl Vocabulary {
    /// Create an empty vocabulary that is not persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a vocabulary from a JSON file. A missing file yields an empty vocabulary.
    pub fn open(path: impl AsRef<Path>) -> CorpusResult<Self> {
        let path = path.as_ref().to_path_buf();
        let words: Vec<Word> = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            Vec::new()
        };

        let mut vocabulary = Self::from_words(words);
        vocabulary.path = Some(path);
        Ok(vocabulary)
    }

    /// Build an in-memory vocabulary from existing words.
    ///
    /// Later duplicates of the same normalized text are merged into the first.
    pub fn from_words(words: impl IntoIterator<Item = Word>) -> Self {
        let mut vocabulary = Self::default();
        for mut word in words {
            word.text = Word::normalize(&word.text);
            if word.text.is_empty() {
                continue;
            }
            match vocabulary.index.get(&word.text) {
                Some(&pos) => vocabulary.words[pos].mids.extend(word.mids),
                None => {
                    vocabulary.index.insert(word.text.clone(), vocabulary.words.len());
                    vocabulary.words.push(word);
                }
            }
        }
        vocabulary
    }

    /// Write the vocabulary to its file. In-memory vocabularies do nothing.
    pub fn save(&self) -> CorpusResult<()> {
        if let Some(path) = &self.path {
            fs::write(path, serde_json::to_string(&self.words)?)?;
        }
        Ok(())
    }

    /// All words in learning order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Get the total number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if no words are known.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Find a word by its text.
    pub fn find(&self, text: &str) -> Option<&Word> {
        self.index
            .get(&Word::normalize(text))
            .map(|&pos| &self.words[pos])
    }

    /// Learn a new word.
    ///
    /// Returns false if the word was already known or normalizes to nothing.
    pub fn add(&mut self, text: &str, author: &str) -> bool {
        let word = Word::new(text).with_author(author);
        if word.text.is_empty() || self.index.contains_key(&word.text) {
            return false;
        }
        self.index.insert(word.text.clone(), self.words.len());
        self.words.push(word);
        true
    }

    /// Record a message id on every known word that occurs in `body`.
    pub fn record_occurrences(&mut self, body: &str, mid: MessageId) {
        for word in self.words.iter_mut() {
            if body.contains(word.text.as_str()) {
                word.add_occurrence(mid);
            }
        }
    }

    /// Record every message containing `text` on that word.
    pub fn backfill<'a>(&mut self, text: &str, messages: impl Iterator<Item = &'a Message>) {
        let Some(&pos) = self.index.get(&Word::normalize(text)) else {
            return;
        };
        let word = &mut self.words[pos];
        for message in messages {
            if message.body.contains(word.text.as_str()) {
                word.add_occurrence(message.id);
            }
        }
    }

    /// All known words occurring somewhere in `text`, in learning order.
    pub fn words_in(&self, text: &str) -> Vec<&Word> {
        self.words
            .iter()
            .filter(|w| text.contains(w.text.as_str()))
            .collect()
    }

    /// Check whether a word occurs in `text`.
    pub fn occurs_in(text: &str, word: &Word) -> bool {
        !word.text.is_empty() && text.contains(word.text.as_str())
    }

    /// Occurrence count at the 2nd percentile of the vocabulary, most frequent first.
    ///
    /// Words whose count is strictly below this border are content words that
    /// may be adopted into generated text. An empty vocabulary has border 0.
    pub fn adoption_border(&self) -> usize {
        if self.words.is_empty() {
            return 0;
        }
        let mut counts: Vec<usize> = self.words.iter().map(Word::occurrence_count).collect();
        counts.sort_unstable_by(|a, b| b.cmp(a));
        counts[counts.len() / ADOPTION_PERCENTILE_DIVISOR]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_find() {
        let mut vocabulary = Vocabulary::new();

        assert!(vocabulary.add("ラーメン", "alice"));
        assert!(!vocabulary.add("ラーメン", "bob"));
        assert!(!vocabulary.add("   ", "bob"));

        let word = vocabulary.find("ラーメン").unwrap();
        assert_eq!(word.author, "alice");
        assert_eq!(vocabulary.len(), 1);
    }

    #[test]
    fn test_record_occurrences() {
        let mut vocabulary = Vocabulary::new();
        vocabulary.add("ラーメン", "");
        vocabulary.add("カレー", "");

        vocabulary.record_occurrences("ラーメンが好き", 0);
        vocabulary.record_occurrences("カレーとラーメン", 1);

        assert_eq!(vocabulary.find("ラーメン").unwrap().occurrence_count(), 2);
        assert_eq!(vocabulary.find("カレー").unwrap().occurrence_count(), 1);
    }

    #[test]
    fn test_backfill() {
        let mut vocabulary = Vocabulary::new();
        vocabulary.add("カレー", "");
        let messages = vec![
            Message::new(0, "alice", "カレー食べた"),
            Message::new(1, "bob", "いいね"),
            Message::new(2, "alice", "またカレー"),
        ];

        vocabulary.backfill("カレー", messages.iter());

        let mids: Vec<_> = vocabulary.find("カレー").unwrap().mids.iter().copied().collect();
        assert_eq!(mids, vec![0, 2]);
    }

    #[test]
    fn test_words_in() {
        let vocabulary = Vocabulary::from_words([Word::new("猫"), Word::new("犬"), Word::new("鳥")]);

        let found: Vec<_> = vocabulary
            .words_in("猫と鳥")
            .into_iter()
            .map(|w| w.text.as_str())
            .collect();
        assert_eq!(found, vec!["猫", "鳥"]);
    }

    #[test]
    fn test_from_words_merges_duplicates() {
        let vocabulary = Vocabulary::from_words([
            Word::new("猫").with_mids([1]),
            Word::new(" 猫 ").with_mids([2]),
        ]);

        assert_eq!(vocabulary.len(), 1);
        assert_eq!(vocabulary.find("猫").unwrap().occurrence_count(), 2);
    }

    #[test]
    fn test_loaded_text_is_normalized() {
        let words: Vec<Word> =
            serde_json::from_str(r#"[{"text": " 猫 ", "mids": [3]}, {"text": "  "}]"#).unwrap();
        let vocabulary = Vocabulary::from_words(words);

        assert_eq!(vocabulary.len(), 1);
        assert_eq!(vocabulary.find("猫").unwrap().text, "猫");
    }

    #[test]
    fn test_open_normalizes_stored_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        std::fs::write(&path, r#"[{"text": " 猫 ", "mids": [3], "author": "alice"}]"#).unwrap();

        let vocabulary = Vocabulary::open(&path).unwrap();

        assert_eq!(vocabulary.find("猫").unwrap().author, "alice");
    }

    #[test]
    fn test_adoption_border_empty() {
        assert_eq!(Vocabulary::new().adoption_border(), 0);
    }

    #[test]
    fn test_adoption_border_percentile() {
        // 100 words with counts 1..=100: index 100 / 50 = 2 of the descending list.
        let words = (1..=100).map(|n| Word::new(format!("w{}", n)).with_mids(0..n));
        let vocabulary = Vocabulary::from_words(words);

        assert_eq!(vocabulary.adoption_border(), 98);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");

        let mut vocabulary = Vocabulary::open(&path).unwrap();
        vocabulary.add("ラーメン", "alice");
        vocabulary.record_occurrences("ラーメン", 7);
        vocabulary.save().unwrap();

        let reloaded = Vocabulary::open(&path).unwrap();
        let word = reloaded.find("ラーメン").unwrap();
        assert_eq!(word.author, "alice");
        assert_eq!(word.mids.iter().copied().collect::<Vec<_>>(), vec![7]);
    }
}
