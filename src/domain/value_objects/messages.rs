//! Message History
//!
//! A timestamp-ordered, deduplicated collection of received messages.
//! Channels and chatters each keep one as their history, and the id
//! deduplication doubles as the delivery-loop breaker for channels that
//! forward to each other.

use std::fmt;

use parking_lot::Mutex;

use crate::domain::entities::message::Message;

/// A shared message history.
#[derive(Default)]
pub struct Messages {
    entries: Mutex<Vec<Message>>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message`, keeping the history ordered by timestamp.
    /// Returns `false` when a message with the same id is already present.
    pub fn add(&self, message: Message) -> bool {
        let mut entries = self.entries.lock();
        if entries.iter().any(|m| m.id() == message.id()) {
            return false;
        }
        let at = entries.partition_point(|m| m.timestamp() <= message.timestamp());
        entries.insert(at, message);
        true
    }

    /// Whether a message with the given id was recorded.
    pub fn contains(&self, message: &Message) -> bool {
        self.entries.lock().iter().any(|m| m.id() == message.id())
    }

    /// A snapshot of the history, oldest first, with deleted messages
    /// filtered out.
    pub fn snapshot(&self) -> Vec<Message> {
        self.entries
            .lock()
            .iter()
            .filter(|m| !m.is_deleted())
            .cloned()
            .collect()
    }

    /// The newest non-deleted message, if any.
    pub fn last(&self) -> Option<Message> {
        self.entries
            .lock()
            .iter()
            .rev()
            .find(|m| !m.is_deleted())
            .cloned()
    }

    /// The number of recorded messages, deleted ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl fmt::Debug for Messages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Messages")
            .field("len", &self.len())
            .finish()
    }
}
