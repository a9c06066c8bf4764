//! Domain Events
//!
//! A typed, synchronous event bus. Listeners are ordered transform
//! functions over a concrete event type; [`EventBus::post`] threads the
//! event through them in registration order and hands back the final
//! state. Cancellable events let any listener veto the surrounding
//! pipeline stage; events carrying targets or policies let listeners
//! rewrite the stage's outcome instead.
//!
//! A bus without listeners is the no-op implementation: `post` returns
//! the event unchanged.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::entities::channel::Channel;
use crate::domain::entities::chatter::Chatter;
use crate::domain::entities::message::Message;
use crate::domain::policies::{JoinPolicy, LeavePolicy, SendPolicy};
use crate::domain::value_objects::Targets;

/// Marker for types that can travel over the [`EventBus`].
pub trait Event: Any + Send {}

/// An event whose pipeline stage can be vetoed by a listener.
pub trait Cancellable {
    fn cancel(&mut self);
    fn is_cancelled(&self) -> bool;
}

type ErasedListener = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;

/// A shared, synchronous event bus. Cheap to clone; all clones dispatch
/// to the same listeners.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<RwLock<HashMap<TypeId, Vec<ErasedListener>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for events of type `E`. Listeners run in
    /// registration order and may mutate the event in place.
    pub fn on<E, F>(&self, listener: F)
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        let erased: ErasedListener = Arc::new(move |event: &mut dyn Any| {
            if let Some(event) = event.downcast_mut::<E>() {
                listener(event);
            }
        });
        self.listeners
            .write()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(erased);
    }

    /// Posts `event` to all listeners of its type and returns the
    /// possibly mutated event.
    pub fn post<E: Event>(&self, mut event: E) -> E {
        // Listeners are cloned out so they run without the lock held;
        // a listener may register further listeners or post again.
        let listeners = self.listeners.read().get(&TypeId::of::<E>()).cloned();
        if let Some(listeners) = listeners {
            for listener in &listeners {
                listener(&mut event);
            }
        }
        event
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.listeners.read().len())
            .finish()
    }
}

/// Fired before a chatter joins a channel. Cancelling or swapping in a
/// denying policy turns the join into an access failure.
pub struct JoinChannelEvent {
    chatter: Chatter,
    channel: Channel,
    policy: JoinPolicy,
    cancelled: bool,
}

impl JoinChannelEvent {
    pub fn new(chatter: Chatter, channel: Channel, policy: JoinPolicy) -> Self {
        Self {
            chatter,
            channel,
            policy,
            cancelled: false,
        }
    }

    pub fn chatter(&self) -> &Chatter {
        &self.chatter
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn policy(&self) -> &JoinPolicy {
        &self.policy
    }

    /// Replaces the policy that will gate the join.
    pub fn replace_policy(&mut self, policy: JoinPolicy) {
        self.policy = policy;
    }
}

impl Event for JoinChannelEvent {}

impl Cancellable for JoinChannelEvent {
    fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Fired after a chatter joined a channel.
pub struct ChatterJoinedChannelEvent {
    pub chatter: Chatter,
    pub channel: Channel,
}

impl Event for ChatterJoinedChannelEvent {}

/// Fired before a chatter leaves a channel.
pub struct LeaveChannelEvent {
    chatter: Chatter,
    channel: Channel,
    policy: LeavePolicy,
    cancelled: bool,
}

impl LeaveChannelEvent {
    pub fn new(chatter: Chatter, channel: Channel, policy: LeavePolicy) -> Self {
        Self {
            chatter,
            channel,
            policy,
            cancelled: false,
        }
    }

    pub fn chatter(&self) -> &Chatter {
        &self.chatter
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    pub fn replace_policy(&mut self, policy: LeavePolicy) {
        self.policy = policy;
    }
}

impl Event for LeaveChannelEvent {}

impl Cancellable for LeaveChannelEvent {
    fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Fired after a chatter left a channel.
pub struct ChatterLeftChannelEvent {
    pub chatter: Chatter,
    pub channel: Channel,
}

impl Event for ChatterLeftChannelEvent {}

/// Fired when a message enters the routing pipeline, before any channel
/// is involved. The targets are a snapshot of the message's target set;
/// listeners may add or remove entries to redirect delivery.
pub struct SendMessageEvent {
    message: Message,
    targets: Targets,
    cancelled: bool,
}

impl SendMessageEvent {
    pub fn new(message: Message) -> Self {
        let targets = Targets::copy_of(message.targets());
        Self {
            message,
            targets,
            cancelled: false,
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// The delivery target set. Shared and interior-mutable, so listeners
    /// rewrite it through the returned handle.
    pub fn targets(&self) -> &Targets {
        &self.targets
    }
}

impl Event for SendMessageEvent {}

impl Cancellable for SendMessageEvent {
    fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Fired before a channel forwards a message to its targets. The targets
/// are a copy of the channel's member set scoped to this one delivery;
/// modifying them never touches the channel's actual membership.
pub struct ChannelMessageEvent {
    channel: Channel,
    message: Message,
    targets: Targets,
    policy: SendPolicy,
    cancelled: bool,
}

impl ChannelMessageEvent {
    pub fn new(channel: Channel, message: Message, policy: SendPolicy) -> Self {
        let targets = Targets::copy_of(channel.targets());
        Self {
            channel,
            message,
            targets,
            policy,
            cancelled: false,
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Replaces the message that will be forwarded.
    pub fn replace_message(&mut self, message: Message) {
        self.message = message;
    }

    /// The delivery-scoped target set.
    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    pub fn policy(&self) -> &SendPolicy {
        &self.policy
    }

    pub fn replace_policy(&mut self, policy: SendPolicy) {
        self.policy = policy;
    }
}

impl Event for ChannelMessageEvent {}

impl Cancellable for ChannelMessageEvent {
    fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
