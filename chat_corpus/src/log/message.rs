//! Message definitions - the immutable records of the conversation log.

use serde::{Deserialize, Serialize};

/// Sender marker for the agent's own utterances.
pub const SELF_NICK: &str = "!";

/// Sender marker for the prompt half of a supervised input/response pair.
pub const INPUT_NICK: &str = "!input";

/// Sender marker for the response half of a supervised input/response pair.
pub const TEACHER_NICK: &str = "!teacher";

/// Position of a message in the conversation log.
pub type MessageId = usize;

/// A single utterance in the conversation log.
///
/// Messages never change once appended. The id is the log position and is
/// assigned by [`MessageLog`](super::MessageLog).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub nick: String,
    pub body: String,
}

impl Message {
    /// Create a new message at the given log position.
    pub fn new(id: MessageId, nick: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            nick: nick.into(),
            body: body.into(),
        }
    }

    /// Whether this message was spoken by the agent itself.
    pub fn is_self(&self) -> bool {
        self.nick == SELF_NICK
    }

    /// Whether the sender is one of the reserved `!` markers rather than a person.
    pub fn is_reserved_sender(&self) -> bool {
        self.nick.starts_with('!')
    }

    /// Whether the message carries no text.
    pub fn is_blank(&self) -> bool {
        self.body.is_empty()
    }
}

/// On-disk form of a message. The id is implied by the line number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MessageRecord {
    pub nick: String,
    pub body: String,
}

impl From<&Message> for MessageRecord {
    fn from(message: &Message) -> Self {
        Self {
            nick: message.nick.clone(),
            body: message.body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_marker() {
        let own = Message::new(0, SELF_NICK, "hello");
        let other = Message::new(1, "alice", "hello");

        assert!(own.is_self());
        assert!(own.is_reserved_sender());
        assert!(!other.is_self());
        assert!(!other.is_reserved_sender());
    }

    #[test]
    fn test_reserved_markers() {
        assert!(Message::new(0, INPUT_NICK, "q").is_reserved_sender());
        assert!(Message::new(0, TEACHER_NICK, "a").is_reserved_sender());
        assert!(!Message::new(0, INPUT_NICK, "q").is_self());
    }

    #[test]
    fn test_blank() {
        assert!(Message::new(0, "alice", "").is_blank());
        assert!(!Message::new(0, "alice", "x").is_blank());
    }
}
