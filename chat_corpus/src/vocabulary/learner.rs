//! Vocabulary learner - grows the vocabulary as the log grows.

use std::cell::RefCell;
use std::rc::Rc;

use super::Vocabulary;
use crate::log::{LogEvent, LogObserver};
use crate::tokenizer::Tokenizer;

/// Log observer that records word occurrences and discovers new words.
///
/// Newly learned words are queued until the owner drains them with
/// [`take_discovered`](Self::take_discovered), so notification and saving
/// stay with whoever owns the transport.
pub struct VocabularyLearner {
    vocabulary: Rc<RefCell<Vocabulary>>,
    tokenizer: Box<dyn Tokenizer>,

    /// Author attributed to newly discovered words.
    current_speaker: String,

    /// Whether appended messages are fed to the tokenizer.
    extract_from_log: bool,

    discovered: Vec<String>,
}

impl VocabularyLearner {
    /// Create a learner feeding the given vocabulary.
    pub fn new(vocabulary: Rc<RefCell<Vocabulary>>, tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            vocabulary,
            tokenizer,
            current_speaker: String::new(),
            extract_from_log: true,
            discovered: Vec::new(),
        }
    }

    /// Choose whether appended messages are tokenized.
    pub fn set_extract_from_log(&mut self, extract: bool) {
        self.extract_from_log = extract;
    }

    /// Get the speaker new words are attributed to.
    pub fn current_speaker(&self) -> &str {
        &self.current_speaker
    }

    /// Set the speaker new words are attributed to.
    pub fn set_current_speaker(&mut self, nick: impl Into<String>) {
        self.current_speaker = nick.into();
    }

    /// Tokenize a line and learn any new words, without touching the log.
    pub fn learn_line(&mut self, line: &str) {
        let candidates = self.tokenizer.extract(line);
        let mut vocabulary = self.vocabulary.borrow_mut();
        for candidate in candidates {
            if vocabulary.add(&candidate, &self.current_speaker) {
                self.discovered.push(candidate);
            }
        }
    }

    /// Drain the words learned since the last call.
    pub fn take_discovered(&mut self) -> Vec<String> {
        std::mem::take(&mut self.discovered)
    }
}

impl LogObserver for VocabularyLearner {
    fn on_log_event(&mut self, event: LogEvent<'_>) {
        let LogEvent::Appended(message) = event else {
            return;
        };

        if !message.is_reserved_sender() {
            self.current_speaker = message.nick.clone();
        }
        if self.extract_from_log {
            self.learn_line(&message.body);
        }
        self.vocabulary
            .borrow_mut()
            .record_occurrences(&message.body, message.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{MessageLog, SELF_NICK};
    use crate::tokenizer::CharClassTokenizer;

    fn learner_for(vocabulary: &Rc<RefCell<Vocabulary>>) -> Rc<RefCell<VocabularyLearner>> {
        Rc::new(RefCell::new(VocabularyLearner::new(
            vocabulary.clone(),
            Box::new(CharClassTokenizer::new()),
        )))
    }

    #[test]
    fn test_learns_from_appended_messages() {
        let vocabulary = Rc::new(RefCell::new(Vocabulary::new()));
        let learner = learner_for(&vocabulary);
        let mut log = MessageLog::new();
        log.subscribe(Box::new(learner.clone()));

        log.append("alice", "「ラーメン」を食べた");

        assert_eq!(learner.borrow_mut().take_discovered(), vec!["ラーメン"]);
        let vocabulary = vocabulary.borrow();
        let word = vocabulary.find("ラーメン").unwrap();
        assert_eq!(word.author, "alice");
        assert!(word.mids.contains(&0));
    }

    #[test]
    fn test_self_messages_keep_previous_speaker() {
        let vocabulary = Rc::new(RefCell::new(Vocabulary::new()));
        let learner = learner_for(&vocabulary);
        let mut log = MessageLog::new();
        log.subscribe(Box::new(learner.clone()));

        log.append("alice", "こんにちは");
        log.append(SELF_NICK, "「カレー」");

        assert_eq!(learner.borrow().current_speaker(), "alice");
        assert_eq!(vocabulary.borrow().find("カレー").unwrap().author, "alice");
    }

    #[test]
    fn test_no_extraction_when_disabled() {
        let vocabulary = Rc::new(RefCell::new(Vocabulary::new()));
        vocabulary.borrow_mut().add("カレー", "");
        let learner = learner_for(&vocabulary);
        learner.borrow_mut().set_extract_from_log(false);
        let mut log = MessageLog::new();
        log.subscribe(Box::new(learner.clone()));

        log.append("alice", "「ラーメン」と「カレー」");

        assert!(vocabulary.borrow().find("ラーメン").is_none());
        // Known words still get their occurrences recorded.
        assert!(vocabulary.borrow().find("カレー").unwrap().mids.contains(&0));
    }

    #[test]
    fn test_learn_line_attributes_current_speaker() {
        let vocabulary = Rc::new(RefCell::new(Vocabulary::new()));
        let learner = learner_for(&vocabulary);

        learner.borrow_mut().set_current_speaker("carol");
        learner.borrow_mut().learn_line("「うどん」");

        assert_eq!(vocabulary.borrow().find("うどん").unwrap().author, "carol");
        assert_eq!(learner.borrow_mut().take_discovered(), vec!["うどん"]);
        assert!(learner.borrow_mut().take_discovered().is_empty());
    }
}
