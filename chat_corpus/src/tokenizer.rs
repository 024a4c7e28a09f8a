//! Word discovery - turns raw utterances into candidate vocabulary.
//!
//! Two interchangeable strategies are provided. The engine picks one at
//! construction time through [`TokenizerKind`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Longest word, in characters, that will be learned.
pub const MAX_WORD_CHARS: usize = 14;

/// How many times a candidate must be seen before it becomes a word.
const DEFAULT_PROMOTE_AFTER: u32 = 2;

/// Discovers words in utterances.
pub trait Tokenizer {
    /// Feed one utterance and return the words that became known through it.
    fn extract(&mut self, line: &str) -> Vec<String>;
}

/// Available tokenizer strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// Runs of katakana, kanji, or latin characters; quoted 「…」 terms.
    #[default]
    CharClass,
    /// Whitespace-delimited tokens.
    Whitespace,
}

impl TokenizerKind {
    /// Construct the tokenizer for this strategy.
    pub fn build(self) -> Box<dyn Tokenizer> {
        match self {
            TokenizerKind::CharClass => Box::new(CharClassTokenizer::new()),
            TokenizerKind::Whitespace => Box::new(WhitespaceTokenizer::new()),
        }
    }
}

/// Counts sightings of candidates until they are promoted to words.
#[derive(Debug, Clone)]
struct CandidateCounter {
    seen: HashMap<String, u32>,
    promote_after: u32,
}

impl CandidateCounter {
    fn new(promote_after: u32) -> Self {
        Self {
            seen: HashMap::new(),
            promote_after: promote_after.max(1),
        }
    }

    /// Returns true exactly once, on the sighting that reaches the threshold.
    fn observe(&mut self, candidate: &str) -> bool {
        let count = self.seen.entry(candidate.to_string()).or_insert(0);
        *count += 1;
        *count == self.promote_after
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Katakana,
    Kanji,
    Latin,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        match c {
            '\u{30A1}'..='\u{30FA}' | 'ー' => CharClass::Katakana,
            '\u{4E00}'..='\u{9FFF}' | '々' => CharClass::Kanji,
            c if c.is_ascii_alphanumeric() => CharClass::Latin,
            _ => CharClass::Other,
        }
    }

    fn min_chars(self) -> usize {
        match self {
            CharClass::Latin => 3,
            _ => 2,
        }
    }
}

/// Heuristic tokenizer for unsegmented Japanese text.
///
/// A run of same-class characters is a candidate; it is learned once seen
/// twice. Text inside 「」 is learned on first sight.
#[derive(Debug, Clone)]
pub struct CharClassTokenizer {
    counter: CandidateCounter,
}

impl CharClassTokenizer {
    pub fn new() -> Self {
        Self {
            counter: CandidateCounter::new(DEFAULT_PROMOTE_AFTER),
        }
    }

    fn runs(line: &str) -> Vec<String> {
        let mut runs = Vec::new();
        let mut current = String::new();
        let mut current_class = CharClass::Other;

        for c in line.chars() {
            let class = CharClass::of(c);
            if class != current_class {
                Self::flush(&mut runs, &mut current, current_class);
                current_class = class;
            }
            if class != CharClass::Other {
                current.push(c);
            }
        }
        Self::flush(&mut runs, &mut current, current_class);
        runs
    }

    fn flush(runs: &mut Vec<String>, current: &mut String, class: CharClass) {
        let len = current.chars().count();
        if class != CharClass::Other && len >= class.min_chars() && len <= MAX_WORD_CHARS {
            runs.push(current.clone());
        }
        current.clear();
    }

    fn quoted(line: &str) -> Vec<String> {
        let mut terms = Vec::new();
        let mut rest = line;
        while let Some(start) = rest.find('「') {
            let after = &rest[start + '「'.len_utf8()..];
            let Some(end) = after.find('」') else {
                break;
            };
            let term = after[..end].trim();
            let len = term.chars().count();
            if len > 0 && len <= MAX_WORD_CHARS {
                terms.push(term.to_string());
            }
            rest = &after[end + '」'.len_utf8()..];
        }
        terms
    }
}

impl Default for CharClassTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for CharClassTokenizer {
    fn extract(&mut self, line: &str) -> Vec<String> {
        let mut words = Self::quoted(line);
        for run in Self::runs(line) {
            if self.counter.observe(&run) && !words.contains(&run) {
                words.push(run);
            }
        }
        words
    }
}

/// Tokenizer for space-delimited languages.
#[derive(Debug, Clone)]
pub struct WhitespaceTokenizer {
    counter: CandidateCounter,
}

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self {
            counter: CandidateCounter::new(DEFAULT_PROMOTE_AFTER),
        }
    }
}

impl Default for WhitespaceTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn extract(&mut self, line: &str) -> Vec<String> {
        let mut words = Vec::new();
        for token in line.split_whitespace() {
            let token = token.trim_matches(|c: char| c.is_ascii_punctuation());
            let len = token.chars().count();
            if len < 3 || len > MAX_WORD_CHARS {
                continue;
            }
            if self.counter.observe(token) && !words.iter().any(|w| w == token) {
                words.push(token.to_string());
            }
        }
        words
    }
}
