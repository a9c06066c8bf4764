//! Common Test Utilities
//!
//! A fully wired routing engine against in-memory infrastructure.

use std::sync::{Arc, Once};

use chat_router::application::{ChannelService, MessageService};
use chat_router::config::templates;
use chat_router::domain::entities::channel::Channel;
use chat_router::domain::entities::chatter::Chatter;
use chat_router::domain::events::EventBus;
use chat_router::domain::repository::Repository;
use chat_router::domain::value_objects::Identity;
use chat_router::infrastructure::{
    InMemoryChannelRepository, InMemoryChatterRepository, NoopChatterStore,
};

/// Test engine with all collaborators wired to in-memory implementations.
pub struct TestEngine {
    pub channels: Arc<InMemoryChannelRepository>,
    pub chatters: Arc<InMemoryChatterRepository>,
    pub events: EventBus,
    pub channel_service: ChannelService,
    pub message_service: MessageService,
}

static TRACING: Once = Once::new();

impl TestEngine {
    pub fn new() -> Self {
        TRACING.call_once(chat_router::telemetry::init_tracing);
        let channels = Arc::new(InMemoryChannelRepository::new());
        let chatters = Arc::new(InMemoryChatterRepository::new());
        let events = EventBus::new();
        let channel_service = ChannelService::new(events.clone(), Arc::new(NoopChatterStore));
        let message_service = MessageService::new(
            channels.clone(),
            chatters.clone(),
            events.clone(),
            templates::private_channel(),
        );
        Self {
            channels,
            chatters,
            events,
            channel_service,
            message_service,
        }
    }

    /// Creates a chatter with every permission granted and registers it.
    pub fn chatter(&self, name: &str) -> Chatter {
        let chatter = Chatter::builder(Identity::new(name))
            .permission_handler(|_| true)
            .build();
        self.chatters.add(chatter.clone()).unwrap();
        chatter
    }

    /// Creates a chatter without any permissions and registers it.
    pub fn restricted_chatter(&self, name: &str) -> Chatter {
        let chatter = Chatter::builder(Identity::new(name)).build();
        self.chatters.add(chatter.clone()).unwrap();
        chatter
    }

    /// Creates a channel wired to the engine's event bus and registers it.
    pub fn channel(&self, key: &str) -> Channel {
        let channel = Channel::builder(key)
            .events(self.events.clone())
            .build()
            .unwrap();
        self.channels.add(channel.clone()).unwrap();
        channel
    }
}
