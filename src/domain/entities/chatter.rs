//! Chatter Entity
//!
//! A chatter is a message participant: a player, the console, or any
//! other command sender. Instead of a subclass per participant kind,
//! the differences are injected at construction as capabilities: a
//! permission check closure and a [`ViewConnector`] display sink.
//!
//! The direct mutators here (`join`, `leave`, `set_active_channel`)
//! change state unconditionally; the policy- and event-gated paths live
//! in the application services.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::entities::channel::Channel;
use crate::domain::entities::message::{Draft, Message, MessageKind};
use crate::domain::pointer::{Pointer, Pointered, Pointers};
use crate::domain::value_objects::{Delivery, Identity, MessageTarget, Messages, TargetKey};

/// The chatter's currently active channel, exposed as a live pointer.
pub static ACTIVE_CHANNEL: Lazy<Pointer<Channel>> = Lazy::new(|| Pointer::new("active_channel"));

type PermissionHandler = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// The display sink of a chatter. Implementations render the chatter's
/// messages and channels on whatever surface backs this participant.
pub trait ViewConnector: Send + Sync {
    /// Called whenever the chatter's visible state changed: a message
    /// arrived, membership changed, or the active channel moved.
    fn update(&self, chatter: &Chatter);
}

/// A view sink that renders nothing. Used for tests and headless
/// participants.
#[derive(Debug, Default)]
pub struct NoView;

impl ViewConnector for NoView {
    fn update(&self, _chatter: &Chatter) {}
}

struct ChatterInner {
    identity: Identity,
    channels: Mutex<Vec<Channel>>,
    active_channel: Mutex<Option<Channel>>,
    messages: Messages,
    permission: PermissionHandler,
    view: Arc<dyn ViewConnector>,
    pointers: OnceCell<Pointers>,
}

/// A message participant. Equality follows the identity id; the handle is
/// cheap to clone and all clones share the same state.
#[derive(Clone)]
pub struct Chatter {
    inner: Arc<ChatterInner>,
}

impl Chatter {
    /// Starts a builder. Without further configuration the chatter has no
    /// permissions and a [`NoView`] sink.
    pub fn builder(identity: Identity) -> ChatterBuilder {
        ChatterBuilder {
            identity,
            permission: Arc::new(|_| false),
            view: Arc::new(NoView),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.inner.identity
    }

    pub fn id(&self) -> Uuid {
        self.inner.identity.id()
    }

    pub fn name(&self) -> &str {
        self.inner.identity.name()
    }

    pub fn display_name(&self) -> &str {
        self.inner.identity.display_name()
    }

    /// The chatter's own message history.
    pub fn messages(&self) -> &Messages {
        &self.inner.messages
    }

    /// A snapshot of the joined channels, sorted by priority then key.
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels = self.inner.channels.lock().clone();
        channels.sort();
        channels
    }

    pub fn is_joined(&self, channel: &Channel) -> bool {
        self.inner.channels.lock().iter().any(|c| c == channel)
    }

    /// Joins `channel` directly: records it in the channel list and adds
    /// this chatter to the channel's targets. Idempotent on both sides.
    pub fn join(&self, channel: &Channel) {
        {
            let mut channels = self.inner.channels.lock();
            if !channels.iter().any(|c| c == channel) {
                channels.push(channel.clone());
            }
        }
        channel.targets().add(Arc::new(self.clone()));
    }

    /// Leaves `channel` directly: removes it from the channel list, this
    /// chatter from the channel's targets, and clears the active channel
    /// if it pointed there.
    pub fn leave(&self, channel: &Channel) {
        self.inner.channels.lock().retain(|c| c != channel);
        channel.targets().remove(&self.target_key());
        let mut active = self.inner.active_channel.lock();
        if active.as_ref() == Some(channel) {
            *active = None;
        }
    }

    pub fn active_channel(&self) -> Option<Channel> {
        self.inner.active_channel.lock().clone()
    }

    pub fn is_active(&self, channel: &Channel) -> bool {
        self.active_channel().as_ref() == Some(channel)
    }

    /// Sets the active channel directly. At most one channel is active.
    pub fn set_active_channel(&self, channel: &Channel) {
        *self.inner.active_channel.lock() = Some(channel.clone());
    }

    pub fn clear_active_channel(&self) {
        *self.inner.active_channel.lock() = None;
    }

    /// Runs the injected capability check. The permission key semantics
    /// belong to the host platform, not to this engine.
    pub fn has_permission(&self, permission: &str) -> bool {
        (self.inner.permission)(permission)
    }

    /// Pushes the chatter's current state to its display sink.
    pub fn update_view(&self) {
        self.inner.view.update(self);
    }

    /// Starts a chat message draft attributed to this chatter.
    pub fn message(&self, text: impl Into<String>) -> Draft {
        Message::draft()
            .source(self.inner.identity.clone())
            .kind(MessageKind::Chat)
            .text(text)
    }
}

impl Pointered for Chatter {
    fn pointers(&self) -> Pointers {
        self.inner.pointers.get().cloned().unwrap_or_default()
    }
}

impl MessageTarget for Chatter {
    fn target_key(&self) -> TargetKey {
        TargetKey::Chatter(self.inner.identity.id())
    }

    fn send_message(&self, message: &Message) -> Delivery {
        if !self.inner.messages.add(message.clone()) {
            return Delivery::Duplicate;
        }
        self.update_view();
        Delivery::Delivered
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for Chatter {
    fn eq(&self, other: &Self) -> bool {
        self.inner.identity == other.inner.identity
    }
}

impl Eq for Chatter {}

impl std::hash::Hash for Chatter {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.identity.hash(state);
    }
}

impl fmt::Debug for Chatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chatter")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("channels", &self.inner.channels.lock().len())
            .finish()
    }
}

/// Builder for [`Chatter`].
pub struct ChatterBuilder {
    identity: Identity,
    permission: PermissionHandler,
    view: Arc<dyn ViewConnector>,
}

impl ChatterBuilder {
    /// Injects the capability check consulted by `has_permission`.
    pub fn permission_handler(
        mut self,
        handler: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.permission = Arc::new(handler);
        self
    }

    /// Injects the display sink.
    pub fn view(mut self, view: impl ViewConnector + 'static) -> Self {
        self.view = Arc::new(view);
        self
    }

    pub fn build(self) -> Chatter {
        let chatter = Chatter {
            inner: Arc::new(ChatterInner {
                identity: self.identity,
                channels: Mutex::new(Vec::new()),
                active_channel: Mutex::new(None),
                messages: Messages::new(),
                permission: self.permission,
                view: self.view,
                pointers: OnceCell::new(),
            }),
        };
        // The active-channel pointer holds a weak handle so the pointer
        // collection inside the chatter does not keep the chatter alive.
        let weak: Weak<ChatterInner> = Arc::downgrade(&chatter.inner);
        let pointers = chatter
            .inner
            .identity
            .pointers()
            .to_builder()
            .with_dynamic(&ACTIVE_CHANNEL, move || {
                weak.upgrade()
                    .and_then(|inner| inner.active_channel.lock().clone())
            })
            .build();
        let _ = chatter.inner.pointers.set(pointers);
        chatter
    }
}
