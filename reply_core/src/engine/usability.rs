//! Usability - which past messages may serve as base messages.

use std::collections::VecDeque;

use chat_corpus::{MessageId, INPUT_NICK, SUPERVISED_CONFIDENCE};

use super::ChatEngine;

/// Fixed-capacity FIFO of recently used base messages.
#[derive(Debug, Clone, Default)]
pub struct RecencyRing {
    ids: VecDeque<MessageId>,
    capacity: usize,
}

impl RecencyRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Remember an id, evicting the oldest when full.
    pub fn push(&mut self, id: MessageId) {
        if self.capacity == 0 {
            return;
        }
        while self.ids.len() >= self.capacity {
            self.ids.pop_front();
        }
        self.ids.push_back(id);
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.ids.contains(&id)
    }

    /// Change the capacity, dropping the oldest ids that no longer fit.
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.ids.len() > capacity {
            self.ids.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl ChatEngine {
    /// Whether message `id` may be used as a base message.
    pub fn is_usable_base_msg(&self, id: MessageId) -> bool {
        let size = self.log.size();
        let Some(message) = self.log.get(id) else {
            return false;
        };
        if message.is_blank() || message.is_self() {
            return false;
        }

        let recent = self.config.recent_unused_count;
        if !self.config.supervised && size > recent && id >= size - recent {
            return false;
        }

        if let Some(target) = &self.target_nick {
            if !target.is_match(&message.nick) {
                return false;
            }
        }
        if let Some(forbidden) = &self.config.forbidden_nick {
            if forbidden.is_match(&message.nick) {
                return false;
            }
        }

        !self.recent_bases.contains(id)
    }

    /// The usable message that answered `id`, with its confidence.
    ///
    /// Supervised engines only trust taught `!input` pairs.
    pub fn response_to(&self, id: MessageId) -> Option<(MessageId, f64)> {
        if !self.config.supervised {
            let usable = |candidate: MessageId| self.is_usable_base_msg(candidate);
            return self.linker.response_to(&self.log, id, &usable);
        }

        let taught = self.log.get(id).is_some_and(|m| m.nick == INPUT_NICK);
        (taught && self.is_usable_base_msg(id + 1)).then_some((id + 1, SUPERVISED_CONFIDENCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_evicts_oldest() {
        let mut ring = RecencyRing::new(2);
        ring.push(1);
        ring.push(2);
        ring.push(3);

        assert!(!ring.contains(1));
        assert!(ring.contains(2));
        assert!(ring.contains(3));
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_ring_resize() {
        let mut ring = RecencyRing::new(3);
        for id in 0..3 {
            ring.push(id);
        }
        ring.resize(1);
        assert_eq!(ring.len(), 1);
        assert!(ring.contains(2));
    }

    #[test]
    fn test_zero_capacity_remembers_nothing() {
        let mut ring = RecencyRing::new(0);
        ring.push(7);
        assert!(ring.is_empty());
    }
}
