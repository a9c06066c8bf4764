//! Message Entity
//!
//! A message is assembled through the fluent [`Draft`] and frozen into an
//! immutable [`Message`] at send time. The only later mutation is the
//! `deleted` flag, which hides the message from history reads without
//! removing it from containers that still hold a reference.

use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::channel::Channel;
use crate::domain::entities::chatter::Chatter;
use crate::domain::value_objects::{Identity, MessageTarget, Targets};

/// What kind of message this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// Player chat, attributed to a source identity.
    Chat,
    /// Announcements and other sourceless notifications.
    System,
}

struct MessageInner {
    id: Uuid,
    timestamp: DateTime<Utc>,
    source: Option<Identity>,
    targets: Targets,
    text: String,
    kind: MessageKind,
    deleted: AtomicBool,
}

/// An immutable, routed message. Equality follows the id, ordering follows
/// `(timestamp, id)`. The handle is cheap to clone.
#[derive(Clone)]
pub struct Message {
    inner: Arc<MessageInner>,
}

impl Message {
    /// Starts a new draft.
    pub fn draft() -> Draft {
        Draft::default()
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.inner.timestamp
    }

    /// The identity this message is attributed to. `None` for system
    /// messages without a source.
    pub fn source(&self) -> Option<&Identity> {
        self.inner.source.as_ref()
    }

    /// The target set the draft accumulated. Frozen in the sense that the
    /// routing pipeline works on copies, not on this set.
    pub fn targets(&self) -> &Targets {
        &self.inner.targets
    }

    pub fn text(&self) -> &str {
        &self.inner.text
    }

    pub fn kind(&self) -> MessageKind {
        self.inner.kind
    }

    /// Flags this message as deleted. History reads skip it from now on.
    pub fn delete(&self) {
        self.inner.deleted.store(true, AtomicOrdering::SeqCst);
    }

    pub fn is_deleted(&self) -> bool {
        self.inner.deleted.load(AtomicOrdering::SeqCst)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Message {}

impl std::hash::Hash for Message {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl PartialOrd for Message {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Message {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp()
            .cmp(&other.timestamp())
            .then_with(|| self.id().cmp(&other.id()))
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("source", &self.inner.source)
            .field("text", &self.inner.text)
            .field("deleted", &self.is_deleted())
            .finish()
    }
}

/// A mutable, in-progress message.
///
/// Drafts accumulate targets and attributes fluently and freeze into a
/// [`Message`] with [`build`](Draft::build).
pub struct Draft {
    timestamp: Option<DateTime<Utc>>,
    source: Option<Identity>,
    targets: Targets,
    text: String,
    kind: MessageKind,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            timestamp: None,
            source: None,
            targets: Targets::new(),
            text: String::new(),
            kind: MessageKind::System,
        }
    }
}

impl Draft {
    /// Attributes the message to `source`.
    pub fn source(mut self, source: Identity) -> Self {
        self.source = Some(source);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Overrides the send timestamp. Without this the message is stamped
    /// when it is built.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Adds any target to the accumulated target set.
    pub fn to_target(self, target: Arc<dyn MessageTarget>) -> Self {
        self.targets.add(target);
        self
    }

    /// Targets the message at `channel`.
    pub fn to_channel(self, channel: &Channel) -> Self {
        self.to_target(Arc::new(channel.clone()))
    }

    /// Targets the message at `chatter` directly.
    pub fn to_chatter(self, chatter: &Chatter) -> Self {
        self.to_target(Arc::new(chatter.clone()))
    }

    /// Freezes the draft into a [`Message`] with a fresh id.
    pub fn build(self) -> Message {
        Message {
            inner: Arc::new(MessageInner {
                id: Uuid::new_v4(),
                timestamp: self.timestamp.unwrap_or_else(Utc::now),
                source: self.source,
                targets: self.targets,
                text: self.text,
                kind: self.kind,
                deleted: AtomicBool::new(false),
            }),
        }
    }
}
