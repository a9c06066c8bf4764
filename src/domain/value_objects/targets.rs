//! Message Targets
//!
//! Anything that can receive a message implements [`MessageTarget`].
//! A [`Targets`] collection fans a message out to every member and folds
//! the individual results into one [`Delivery`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::message::Message;

/// The outcome of handing a message to a target.
///
/// Ordering ranks outcomes by success, so folding a broadcast result is a
/// plain `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Delivery {
    /// The target refused the message.
    Rejected,
    /// The target had already received this exact message.
    Duplicate,
    /// The target accepted the message.
    Delivered,
}

/// The stable identity of a target inside a [`Targets`] collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKey {
    Chatter(Uuid),
    Channel(String),
}

/// A receiver of messages.
pub trait MessageTarget: Send + Sync {
    /// The identity this target is deduplicated and removed by.
    fn target_key(&self) -> TargetKey;

    /// Hands `message` to this target.
    fn send_message(&self, message: &Message) -> Delivery;

    /// Downcast support for callers that need the concrete target type.
    fn as_any(&self) -> &dyn Any;
}

struct TargetsInner {
    id: Uuid,
    entries: Mutex<Vec<Arc<dyn MessageTarget>>>,
}

/// A shared, mutable set of message targets.
///
/// The handle is cheap to clone and all clones share the same member list.
/// Members are deduplicated by their [`TargetKey`], so re-adding a target
/// is a no-op.
#[derive(Clone)]
pub struct Targets {
    inner: Arc<TargetsInner>,
}

impl Targets {
    /// Creates an empty target set.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TargetsInner {
                id: Uuid::new_v4(),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Creates an independent snapshot of `other`. Later changes to either
    /// set are not visible to the other.
    pub fn copy_of(other: &Targets) -> Self {
        Self {
            inner: Arc::new(TargetsInner {
                id: Uuid::new_v4(),
                entries: Mutex::new(other.inner.entries.lock().clone()),
            }),
        }
    }

    /// Adds `target` unless a member with the same key is already present.
    /// Returns whether the target was added.
    pub fn add(&self, target: Arc<dyn MessageTarget>) -> bool {
        let mut entries = self.inner.entries.lock();
        if entries.iter().any(|t| t.target_key() == target.target_key()) {
            return false;
        }
        entries.push(target);
        true
    }

    /// Removes the member with the given key. Returns whether a member
    /// was removed.
    pub fn remove(&self, key: &TargetKey) -> bool {
        let mut entries = self.inner.entries.lock();
        let before = entries.len();
        entries.retain(|t| t.target_key() != *key);
        entries.len() != before
    }

    /// Whether a member with the given key is present.
    pub fn contains(&self, key: &TargetKey) -> bool {
        self.inner
            .entries
            .lock()
            .iter()
            .any(|t| t.target_key() == *key)
    }

    /// A snapshot of the current members.
    pub fn entries(&self) -> Vec<Arc<dyn MessageTarget>> {
        self.inner.entries.lock().clone()
    }

    /// A snapshot of the chatter members.
    pub fn chatters(&self) -> Vec<Arc<dyn MessageTarget>> {
        self.filtered(|key| matches!(key, TargetKey::Chatter(_)))
    }

    /// A snapshot of the channel members.
    pub fn channels(&self) -> Vec<Arc<dyn MessageTarget>> {
        self.filtered(|key| matches!(key, TargetKey::Channel(_)))
    }

    fn filtered(&self, keep: impl Fn(&TargetKey) -> bool) -> Vec<Arc<dyn MessageTarget>> {
        self.inner
            .entries
            .lock()
            .iter()
            .filter(|t| keep(&t.target_key()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }

    /// Fans `message` out to a snapshot of the current members and folds
    /// the results. Every member is attempted; one rejection does not
    /// short-circuit the rest. An empty set counts as delivered.
    pub fn send_message(&self, message: &Message) -> Delivery {
        self.entries()
            .iter()
            .map(|target| target.send_message(message))
            .max()
            .unwrap_or(Delivery::Delivered)
    }
}

impl Default for Targets {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Targets {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Targets {}

impl fmt::Debug for Targets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<TargetKey> = self
            .inner
            .entries
            .lock()
            .iter()
            .map(|t| t.target_key())
            .collect();
        f.debug_struct("Targets")
            .field("id", &self.inner.id)
            .field("members", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::entities::message::Message;
    use pretty_assertions::assert_eq;

    struct StubTarget {
        id: Uuid,
        outcome: Delivery,
        received: AtomicUsize,
    }

    impl StubTarget {
        fn new(outcome: Delivery) -> Arc<Self> {
            Arc::new(Self {
                id: Uuid::new_v4(),
                outcome,
                received: AtomicUsize::new(0),
            })
        }
    }

    impl MessageTarget for StubTarget {
        fn target_key(&self) -> TargetKey {
            TargetKey::Chatter(self.id)
        }

        fn send_message(&self, _message: &Message) -> Delivery {
            self.received.fetch_add(1, Ordering::SeqCst);
            self.outcome
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn message() -> Message {
        Message::draft().text("hello").build()
    }

    #[test]
    fn test_add_deduplicates_by_target_key() {
        let targets = Targets::new();
        let target = StubTarget::new(Delivery::Delivered);

        assert!(targets.add(target.clone()));
        assert!(!targets.add(target.clone()));
        assert_eq!(targets.len(), 1);
        assert!(targets.contains(&target.target_key()));
    }

    #[test]
    fn test_remove_by_key() {
        let targets = Targets::new();
        let target = StubTarget::new(Delivery::Delivered);
        targets.add(target.clone());

        assert!(targets.remove(&target.target_key()));
        assert!(!targets.remove(&target.target_key()));
        assert!(targets.is_empty());
    }

    #[test]
    fn test_broadcast_reaches_every_member_without_short_circuit() {
        let targets = Targets::new();
        let rejecting = StubTarget::new(Delivery::Rejected);
        let accepting = StubTarget::new(Delivery::Delivered);
        targets.add(rejecting.clone());
        targets.add(accepting.clone());

        assert_eq!(targets.send_message(&message()), Delivery::Delivered);
        assert_eq!(rejecting.received.load(Ordering::SeqCst), 1);
        assert_eq!(accepting.received.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_broadcast_folds_to_the_best_outcome() {
        let targets = Targets::new();
        targets.add(StubTarget::new(Delivery::Rejected));
        targets.add(StubTarget::new(Delivery::Duplicate));
        assert_eq!(targets.send_message(&message()), Delivery::Duplicate);

        let rejected_only = Targets::new();
        rejected_only.add(StubTarget::new(Delivery::Rejected));
        assert_eq!(rejected_only.send_message(&message()), Delivery::Rejected);
    }

    #[test]
    fn test_empty_broadcast_counts_as_delivered() {
        assert_eq!(Targets::new().send_message(&message()), Delivery::Delivered);
    }

    #[test]
    fn test_target_keys_serialize_for_replication() {
        let chatter = TargetKey::Chatter(Uuid::nil());
        let channel = TargetKey::Channel("town".to_string());

        let json = serde_json::to_string(&vec![chatter.clone(), channel.clone()]).unwrap();
        let restored: Vec<TargetKey> = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, vec![chatter, channel]);
    }

    #[test]
    fn test_copy_of_is_an_independent_snapshot() {
        let original = Targets::new();
        original.add(StubTarget::new(Delivery::Delivered));

        let copy = Targets::copy_of(&original);
        assert_eq!(copy.len(), 1);

        copy.add(StubTarget::new(Delivery::Delivered));
        assert_eq!(copy.len(), 2);
        assert_eq!(original.len(), 1);
    }
}
