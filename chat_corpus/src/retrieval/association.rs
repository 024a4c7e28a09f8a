//! Word associations - one associated word per known word.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::CorpusResult;

/// Free-association lookup.
pub trait AssociationTable {
    /// The word associated with `word`, if any.
    fn associate(&self, word: &str) -> Option<&str>;
}

/// Association table read from a tab-separated file.
///
/// Each line holds `word<TAB>associated word`. Lines without a tab are
/// ignored; the first entry for a word wins.
#[derive(Debug, Clone, Default)]
pub struct WordAssociator {
    table: HashMap<String, String>,
}

impl WordAssociator {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a file. A missing file yields an empty table.
    pub fn open(path: impl AsRef<Path>) -> CorpusResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Parse table contents.
    pub fn parse(content: &str) -> Self {
        let mut associator = Self::new();
        for line in content.lines() {
            match line.split_once('\t') {
                Some((word, associated)) => associator.insert(word, associated),
                None if line.trim().is_empty() => {}
                None => tracing::debug!("Ignoring association line without a tab: {}", line),
            }
        }
        associator
    }

    /// Add an association unless the word already has one.
    pub fn insert(&mut self, word: &str, associated: &str) {
        let (word, associated) = (word.trim(), associated.trim());
        if word.is_empty() || associated.is_empty() {
            return;
        }
        self.table
            .entry(word.to_string())
            .or_insert_with(|| associated.to_string());
    }

    /// Get the total number of associations.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl AssociationTable for WordAssociator {
    fn associate(&self, word: &str) -> Option<&str> {
        self.table.get(word).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let associator = WordAssociator::parse("猫\t犬\n\nbroken line\n雨\t傘\n猫\t魚\n");

        assert_eq!(associator.len(), 2);
        assert_eq!(associator.associate("猫"), Some("犬"));
        assert_eq!(associator.associate("雨"), Some("傘"));
        assert_eq!(associator.associate("鳥"), None);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let associator = WordAssociator::open(dir.path().join("assoc.txt")).unwrap();
        assert!(associator.is_empty());
    }
}
