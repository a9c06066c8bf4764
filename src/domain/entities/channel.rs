//! Channel Entity
//!
//! A channel is a named message target with its own settings, a live
//! membership set and a message history. Identity, equality and hashing
//! follow the immutable key alone; two channel objects sharing a key are
//! the same channel for any keyed collection. Ordering follows
//! `(PRIORITY, key)` and drives view ordering, not identity.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::entities::message::Message;
use crate::domain::events::{Cancellable, ChannelMessageEvent, EventBus};
use crate::domain::pointer::{Configured, Setting, Settings, SettingsBuilder};
use crate::domain::policies::SEND_POLICY;
use crate::domain::value_objects::{Delivery, MessageTarget, Messages, TargetKey, Targets};
use crate::shared::error::ChatError;
use crate::shared::validation::validate_channel_key;

/// The channel key, mirrored into the settings for config round-trips.
pub static KEY: Lazy<Setting<String>> = Lazy::new(|| Setting::new("key", String::new()));

/// The presentation name of the channel. Defaults to the key.
pub static DISPLAY_NAME: Lazy<Setting<String>> =
    Lazy::new(|| Setting::new("display_name", String::new()));

/// Sort weight for channel listings. Lower sorts first.
pub static PRIORITY: Lazy<Setting<i32>> = Lazy::new(|| Setting::new("priority", 100));

/// Protected channels gate joins behind [`JOIN_PERMISSION`] and sends
/// behind membership.
pub static PROTECTED: Lazy<Setting<bool>> = Lazy::new(|| Setting::new("protected", false));

/// The permission required to join when the channel is protected.
pub static JOIN_PERMISSION: Lazy<Setting<String>> =
    Lazy::new(|| Setting::new("join_permission", "chat.channel.join".to_string()));

/// Global channels are replicated across servers by an external messenger.
pub static GLOBAL: Lazy<Setting<bool>> = Lazy::new(|| Setting::new("global", true));

/// Private channels carry direct messages between two chatters.
pub static PRIVATE: Lazy<Setting<bool>> = Lazy::new(|| Setting::new("private", false));

/// Hidden channels are excluded from public channel listings.
pub static HIDDEN: Lazy<Setting<bool>> = Lazy::new(|| Setting::new("hidden", false));

/// Auto-join channels are joined on login without an explicit command.
pub static AUTO_JOIN: Lazy<Setting<bool>> = Lazy::new(|| Setting::new("auto_join", false));

/// Forced channels cannot be left.
pub static FORCED: Lazy<Setting<bool>> = Lazy::new(|| Setting::new("forced", false));

struct ChannelInner {
    key: String,
    settings: RwLock<Settings>,
    targets: Targets,
    messages: Messages,
    events: EventBus,
}

/// A named, configurable message target with live membership.
///
/// The handle is cheap to clone; all clones share the same channel state.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl Channel {
    /// Starts a builder for a channel with the given key.
    pub fn builder(key: impl Into<String>) -> ChannelBuilder {
        ChannelBuilder::new(key)
    }

    /// The immutable channel key.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// The configured display name, falling back to the key.
    pub fn display_name(&self) -> String {
        let name = self.get(&DISPLAY_NAME);
        if name.is_empty() {
            self.inner.key.clone()
        } else {
            name
        }
    }

    /// The live membership set.
    pub fn targets(&self) -> &Targets {
        &self.inner.targets
    }

    /// The channel's own message history.
    pub fn messages(&self) -> &Messages {
        &self.inner.messages
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Replaces the settings wholesale, e.g. on a config reload. The key
    /// stays immutable regardless of what the new settings carry.
    pub fn replace_settings(&self, settings: Settings) {
        *self.inner.settings.write() = settings;
    }

    /// Adds a member. Duplicate adds are absorbed by the target set.
    pub fn add_target(&self, target: Arc<dyn MessageTarget>) -> bool {
        self.inner.targets.add(target)
    }

    /// Removes the member with the given key.
    pub fn remove_target(&self, key: &TargetKey) -> bool {
        self.inner.targets.remove(key)
    }

    /// Routes `message` through this channel.
    ///
    /// The message is recorded into the channel history first, which makes
    /// redelivery of the same message a [`Delivery::Duplicate`] no-op and
    /// breaks forwarding cycles between cross-linked channels. The
    /// cancellable [`ChannelMessageEvent`] then runs with a copy of the
    /// member set and the resolved send policy; listeners may veto,
    /// rewrite the message, swap the policy or edit the delivery targets.
    pub fn send_message(&self, message: &Message) -> Delivery {
        if !self.inner.messages.add(message.clone()) {
            return Delivery::Duplicate;
        }
        let event = self.inner.events.post(ChannelMessageEvent::new(
            self.clone(),
            message.clone(),
            self.get(&SEND_POLICY),
        ));
        if event.is_cancelled() {
            debug!(channel = %self.inner.key, "channel message cancelled");
            return Delivery::Rejected;
        }
        if !event.policy().test(self, event.message()) {
            debug!(channel = %self.inner.key, "channel message denied by send policy");
            return Delivery::Rejected;
        }
        event.targets().send_message(event.message())
    }
}

impl Configured for Channel {
    fn settings(&self) -> Settings {
        self.inner.settings.read().clone()
    }
}

impl MessageTarget for Channel {
    fn target_key(&self) -> TargetKey {
        TargetKey::Channel(self.inner.key.clone())
    }

    fn send_message(&self, message: &Message) -> Delivery {
        Channel::send_message(self, message)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.inner.key == other.inner.key
    }
}

impl Eq for Channel {}

impl std::hash::Hash for Channel {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.key.hash(state);
    }
}

impl PartialOrd for Channel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Channel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.get(&PRIORITY)
            .cmp(&other.get(&PRIORITY))
            .then_with(|| self.inner.key.cmp(&other.inner.key))
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("key", &self.inner.key)
            .field("members", &self.inner.targets.len())
            .finish()
    }
}

/// Builder for [`Channel`]. Seeds the key, display name and the per-key
/// join permission (`chat.channel.<key>.join`) into the settings.
pub struct ChannelBuilder {
    key: String,
    settings: SettingsBuilder,
    events: EventBus,
}

impl ChannelBuilder {
    fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let settings = Settings::builder()
            .with_static(&KEY, key.clone())
            .with_static(&DISPLAY_NAME, key.clone())
            .with_static(&JOIN_PERMISSION, format!("chat.channel.{key}.join"));
        Self {
            key,
            settings,
            events: EventBus::new(),
        }
    }

    /// Wires the event bus posted to by the channel's send pipeline.
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Binds a setting. Later calls for the same setting replace earlier
    /// ones, which is what lets templates layer over each other.
    pub fn set<V>(mut self, setting: &Setting<V>, value: V) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        self.settings = self.settings.with_static(setting, value);
        self
    }

    /// Builds the channel, failing with [`ChatError::InvalidKey`] for a
    /// malformed key. No partial channel is observable on failure.
    pub fn build(self) -> Result<Channel, ChatError> {
        validate_channel_key(&self.key)?;
        Ok(Channel {
            inner: Arc::new(ChannelInner {
                key: self.key,
                settings: RwLock::new(self.settings.build()),
                targets: Targets::new(),
                messages: Messages::new(),
                events: self.events,
            }),
        })
    }
}
