//! Conversation log - the append-only record of everything said.
//!
//! Observers are notified synchronously, in registration order, after each
//! append and after a clear. Persistence is line-oriented JSON; a write
//! failure is logged and the in-memory log still advances.

mod message;

pub use message::*;

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{CorpusError, CorpusResult};

/// Events delivered to log observers.
#[derive(Debug, Clone, Copy)]
pub enum LogEvent<'a> {
    /// A message was appended at the end of the log.
    Appended(&'a Message),
    /// Every message was removed.
    Cleared,
}

/// Receives log events.
pub trait LogObserver {
    fn on_log_event(&mut self, event: LogEvent<'_>);
}

impl<T: LogObserver + ?Sized> LogObserver for Rc<RefCell<T>> {
    fn on_log_event(&mut self, event: LogEvent<'_>) {
        self.borrow_mut().on_log_event(event);
    }
}

/// Integer-indexed, append-only sequence of messages.
///
/// Slots may be empty when a persisted record could not be read back; every
/// lookup treats such a slot as a missing message.
#[derive(Default)]
pub struct MessageLog {
    messages: Vec<Option<Message>>,
    observers: Vec<Box<dyn LogObserver>>,
    path: Option<PathBuf>,
}

impl MessageLog {
    /// Create an empty log that is not persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a persisted log, creating an empty one if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> CorpusResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut messages = Vec::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                let id = messages.len();
                match parse_record(line_no + 1, &line) {
                    Ok(record) => messages.push(Some(Message::new(id, record.nick, record.body))),
                    Err(e) => {
                        tracing::warn!("Skipping log record: {}", e);
                        messages.push(None);
                    }
                }
            }
        }

        Ok(Self {
            messages,
            observers: Vec::new(),
            path: Some(path),
        })
    }

    /// Register an observer. Observers run in registration order.
    pub fn subscribe(&mut self, observer: Box<dyn LogObserver>) {
        self.observers.push(observer);
    }

    /// Number of slots in the log, including unreadable ones.
    pub fn size(&self) -> usize {
        self.messages.len()
    }

    /// Check if the log has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get a message by id. Out-of-range ids and unreadable slots yield `None`.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(id).and_then(|m| m.as_ref())
    }

    /// Get the most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last().and_then(|m| m.as_ref())
    }

    /// Iterate over all readable messages in log order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().flatten()
    }

    /// Append a message and notify observers.
    ///
    /// Returns the id assigned to the new message.
    pub fn append(&mut self, nick: impl Into<String>, body: impl Into<String>) -> MessageId {
        let id = self.messages.len();
        let message = Message::new(id, nick, body);

        if let Err(e) = self.persist(&message) {
            tracing::warn!("Failed to persist message {}: {}", id, e);
        }

        self.messages.push(Some(message));
        if let Some(Some(message)) = self.messages.last() {
            for observer in self.observers.iter_mut() {
                observer.on_log_event(LogEvent::Appended(message));
            }
        }
        id
    }

    /// Remove every message and notify observers.
    pub fn clear(&mut self) {
        self.messages.clear();

        if let Some(path) = &self.path {
            if let Err(e) = File::create(path) {
                tracing::warn!("Failed to truncate log {}: {}", path.display(), e);
            }
        }

        for observer in self.observers.iter_mut() {
            observer.on_log_event(LogEvent::Cleared);
        }
    }

    fn persist(&self, message: &Message) -> CorpusResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let line = serde_json::to_string(&MessageRecord::from(message))?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

fn parse_record(line_no: usize, line: &str) -> CorpusResult<MessageRecord> {
    serde_json::from_str(line).map_err(|e| CorpusError::MalformedRecord {
        line: line_no,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        seen: Rc<RefCell<Vec<String>>>,
        label: &'static str,
    }

    impl LogObserver for Recorder {
        fn on_log_event(&mut self, event: LogEvent<'_>) {
            let entry = match event {
                LogEvent::Appended(m) => format!("{}:{}", self.label, m.id),
                LogEvent::Cleared => format!("{}:clear", self.label),
            };
            self.seen.borrow_mut().push(entry);
        }
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let mut log = MessageLog::new();

        assert_eq!(log.append("alice", "hi"), 0);
        assert_eq!(log.append("bob", "hello"), 1);
        assert_eq!(log.size(), 2);
        assert_eq!(log.get(1).unwrap().body, "hello");
        assert_eq!(log.last().unwrap().nick, "bob");
    }

    #[test]
    fn test_out_of_range_is_none() {
        let mut log = MessageLog::new();
        log.append("alice", "hi");

        assert!(log.get(1).is_none());
        assert!(log.get(usize::MAX).is_none());
    }

    #[test]
    fn test_observers_run_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut log = MessageLog::new();
        log.subscribe(Box::new(Recorder {
            seen: seen.clone(),
            label: "first",
        }));
        log.subscribe(Box::new(Recorder {
            seen: seen.clone(),
            label: "second",
        }));

        log.append("alice", "hi");
        log.clear();

        assert_eq!(
            *seen.borrow(),
            vec!["first:0", "second:0", "first:clear", "second:clear"]
        );
        assert!(log.is_empty());
    }

    #[test]
    fn test_shared_observer() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let shared = Rc::new(RefCell::new(Recorder {
            seen: seen.clone(),
            label: "shared",
        }));
        let mut log = MessageLog::new();
        log.subscribe(Box::new(shared.clone()));

        log.append("alice", "hi");

        assert_eq!(*seen.borrow(), vec!["shared:0"]);
    }

    #[test]
    fn test_persisted_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");

        {
            let mut log = MessageLog::open(&path).unwrap();
            log.append("alice", "ありがとう！");
            log.append("bob", "どういたしまして");
        }

        let log = MessageLog::open(&path).unwrap();
        assert_eq!(log.size(), 2);
        assert_eq!(log.get(0).unwrap().body, "ありがとう！");
        assert_eq!(log.get(1).unwrap().nick, "bob");
    }

    #[test]
    fn test_malformed_line_becomes_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(
            &path,
            "{\"nick\":\"alice\",\"body\":\"one\"}\nnot json\n{\"nick\":\"bob\",\"body\":\"three\"}\n",
        )
        .unwrap();

        let log = MessageLog::open(&path).unwrap();
        assert_eq!(log.size(), 3);
        assert!(log.get(1).is_none());
        assert_eq!(log.get(2).unwrap().id, 2);
        assert_eq!(log.iter().count(), 2);
    }
}
