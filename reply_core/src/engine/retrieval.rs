//! Base-message retrieval by shared keyword, by similarity, and at random.

use rand::seq::SliceRandom;
use rand::Rng;

use chat_corpus::MessageId;

use super::ChatEngine;

/// Linked candidates evaluated before a search stops.
pub const MAX_LINKED_CANDIDATES: usize = 5;

/// Random log positions tried before giving up.
pub const RANDOM_FALLBACK_SAMPLES: usize = 2000;

/// Running state of a search over candidate source messages.
#[derive(Debug, Default)]
struct LinkedSearch {
    best: Option<(MessageId, MessageId)>,
    best_confidence: f64,
    linked: usize,
}

impl LinkedSearch {
    /// Evaluate one candidate. Returns false once the search is exhausted.
    fn visit(&mut self, engine: &ChatEngine, id: MessageId) -> bool {
        let Some((response, confidence)) = engine.response_to(id) else {
            return true;
        };
        if confidence > self.best_confidence {
            self.best = Some((id, response));
            self.best_confidence = confidence;
        }
        self.linked += 1;
        self.linked < MAX_LINKED_CANDIDATES
    }

    fn finish(self) -> Option<(MessageId, MessageId)> {
        if let Some((id, response)) = self.best {
            tracing::debug!(id, response, confidence = self.best_confidence, "Linked base message");
        }
        self.best
    }
}

impl ChatEngine {
    /// Best `(source, response)` pair among the first linked candidates of `ids`.
    fn best_linked(&self, ids: impl Iterator<Item = MessageId>) -> Option<(MessageId, MessageId)> {
        let mut search = LinkedSearch::default();
        for id in ids {
            if !search.visit(self, id) {
                break;
            }
        }
        search.finish()
    }

    /// A message containing one of `words` and the reply it got.
    ///
    /// Words and their occurrences are visited in random order. Occurrences
    /// of a word are only gathered once the search reaches that word.
    pub fn base_msg_using_keyword(&mut self, words: &[String]) -> Option<(MessageId, MessageId)> {
        let mut order: Vec<&String> = words.iter().collect();
        order.shuffle(&mut self.rng);

        let mut search = LinkedSearch::default();
        'words: for text in order {
            let mut mids: Vec<MessageId> = match self.vocabulary.borrow().find(text) {
                Some(word) => word.mids.iter().copied().collect(),
                None => continue,
            };
            mids.shuffle(&mut self.rng);
            for id in mids {
                if !search.visit(self, id) {
                    break 'words;
                }
            }
        }
        search.finish()
    }

    /// A message similar to `text` and the reply it got.
    pub fn base_msg_using_similarity(&self, text: &str) -> Option<(MessageId, MessageId)> {
        let similarity = self.similarity.borrow();
        let best = self.best_linked(similarity.similar_messages(text));
        best
    }

    /// Any usable message with non-empty base text, found by sampling random
    /// log positions.
    pub fn random_base_msg(&mut self) -> Option<MessageId> {
        let size = self.log.size();
        if size == 0 {
            return None;
        }
        for _ in 0..RANDOM_FALLBACK_SAMPLES {
            let id = self.rng.gen_range(0..size);
            if self.is_usable_base_msg(id) && self.base_msg_str(id).is_some() {
                return Some(id);
            }
        }
        None
    }
}
