//! Response linking - which later message answered a given message.

use crate::log::{MessageId, MessageLog, INPUT_NICK, TEACHER_NICK};

/// Confidence of a taught `!input` → `!teacher` pair.
pub const SUPERVISED_CONFIDENCE: f64 = 20.0;

/// Links a message to the message that most plausibly replied to it.
pub trait ResponseLinker {
    /// The best usable reply to `id` with its confidence, or `None`.
    ///
    /// Only ids accepted by `usable` may be returned.
    fn response_to(
        &self,
        log: &MessageLog,
        id: MessageId,
        usable: &dyn Fn(MessageId) -> bool,
    ) -> Option<(MessageId, f64)>;
}

/// Looks at the few messages following the source and prefers the nearest
/// one from a different speaker.
#[derive(Debug, Clone)]
pub struct FollowUpLinker {
    /// How many following messages are considered.
    pub window: usize,

    /// Confidence multiplier when the follow-up comes from the same speaker.
    pub same_speaker_factor: f64,
}

impl Default for FollowUpLinker {
    fn default() -> Self {
        Self {
            window: 5,
            same_speaker_factor: 0.5,
        }
    }
}

impl ResponseLinker for FollowUpLinker {
    fn response_to(
        &self,
        log: &MessageLog,
        id: MessageId,
        usable: &dyn Fn(MessageId) -> bool,
    ) -> Option<(MessageId, f64)> {
        let source = log.get(id)?;
        if source.is_blank() {
            return None;
        }

        let mut best: Option<(MessageId, f64)> = None;
        for distance in 1..=self.window {
            let candidate_id = id + distance;
            let Some(candidate) = log.get(candidate_id) else {
                continue;
            };
            if !usable(candidate_id) {
                continue;
            }

            let score = if source.nick == INPUT_NICK && candidate.nick == TEACHER_NICK {
                SUPERVISED_CONFIDENCE
            } else if candidate.nick == source.nick {
                self.same_speaker_factor / distance as f64
            } else {
                1.0 / distance as f64
            };

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate_id, score));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_of(entries: &[(&str, &str)]) -> MessageLog {
        let mut log = MessageLog::new();
        for (nick, body) in entries {
            log.append(*nick, *body);
        }
        log
    }

    #[test]
    fn test_nearest_other_speaker_wins() {
        let log = log_of(&[("alice", "ありがとう！"), ("bob", "どういたしまして"), ("carol", "うん")]);
        let linker = FollowUpLinker::default();

        let (id, score) = linker.response_to(&log, 0, &|_| true).unwrap();
        assert_eq!(id, 1);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_speaker_is_discounted() {
        let log = log_of(&[("alice", "ねえ"), ("alice", "聞いてる？"), ("bob", "うん")]);
        let linker = FollowUpLinker::default();

        let (id, _) = linker.response_to(&log, 0, &|_| true).unwrap();
        // 0.5 / 1 for alice vs 1.0 / 2 for bob: the earlier candidate keeps the tie.
        assert_eq!(id, 1);
    }

    #[test]
    fn test_respects_usability() {
        let log = log_of(&[("alice", "ありがとう！"), ("bob", "どういたしまして"), ("carol", "うん")]);
        let linker = FollowUpLinker::default();

        let (id, _) = linker.response_to(&log, 0, &|id| id != 1).unwrap();
        assert_eq!(id, 2);
        assert!(linker.response_to(&log, 0, &|_| false).is_none());
    }

    #[test]
    fn test_supervised_pair() {
        let log = log_of(&[(INPUT_NICK, "元気？"), (TEACHER_NICK, "元気だよ")]);
        let linker = FollowUpLinker::default();

        let (id, score) = linker.response_to(&log, 0, &|_| true).unwrap();
        assert_eq!(id, 1);
        assert_eq!(score, SUPERVISED_CONFIDENCE);
    }

    #[test]
    fn test_missing_source() {
        let log = log_of(&[("alice", "")]);
        let linker = FollowUpLinker::default();

        assert!(linker.response_to(&log, 0, &|_| true).is_none());
        assert!(linker.response_to(&log, 5, &|_| true).is_none());
    }
}
