//! Message Service
//!
//! The message-routing pipeline: channel chat, direct broadcasts and the
//! on-demand private-channel provisioning protocol.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::config::templates::ChannelTemplate;
use crate::domain::entities::channel::{Channel, DISPLAY_NAME};
use crate::domain::entities::chatter::Chatter;
use crate::domain::entities::message::{Draft, Message};
use crate::domain::events::{Cancellable, EventBus, SendMessageEvent};
use crate::domain::repository::{ChannelRepository, ChatterRepository};
use crate::domain::value_objects::{Delivery, Identity, TargetKey};
use crate::shared::error::ChatError;

/// Routes messages to their targets.
pub struct MessageService {
    channels: Arc<dyn ChannelRepository>,
    chatters: Arc<dyn ChatterRepository>,
    events: EventBus,
    private_template: ChannelTemplate,
}

impl MessageService {
    pub fn new(
        channels: Arc<dyn ChannelRepository>,
        chatters: Arc<dyn ChatterRepository>,
        events: EventBus,
        private_template: ChannelTemplate,
    ) -> Self {
        Self {
            channels,
            chatters,
            events,
            private_template,
        }
    }

    /// Freezes `draft` and routes the message.
    pub fn send(&self, draft: Draft) -> Result<Message, ChatError> {
        self.send_message(draft.build())
    }

    /// Routes an already built message.
    ///
    /// A cancellable [`SendMessageEvent`] runs first; listeners may veto
    /// or rewrite the delivery targets. When the resulting target set is
    /// exactly one chatter differing from the source, the message is
    /// routed through the private-channel protocol (both parties must be
    /// registered in the chatter repository); otherwise it is broadcast
    /// to the target set.
    pub fn send_message(&self, message: Message) -> Result<Message, ChatError> {
        let event = self.events.post(SendMessageEvent::new(message.clone()));
        if event.is_cancelled() {
            debug!(message = %message.id(), "send cancelled");
            return Err(ChatError::Rejected);
        }

        if let Some((source_id, recipient_id)) = private_route(&event) {
            let source = self.registered_chatter(source_id)?;
            let target = self.registered_chatter(recipient_id)?;
            return self.deliver_private(&source, &target, &message);
        }

        match event.targets().send_message(&message) {
            Delivery::Rejected => Err(ChatError::Rejected),
            _ => Ok(message),
        }
    }

    /// Sends a chat message into the chatter's active channel.
    /// Without an active channel no message is constructed at all.
    pub fn chat(&self, chatter: &Chatter, text: &str) -> Result<Message, ChatError> {
        let channel = chatter
            .active_channel()
            .ok_or(ChatError::NoActiveChannel)?;
        let message = chatter.message(text).to_channel(&channel).build();
        match channel.send_message(&message) {
            Delivery::Rejected => Err(ChatError::Rejected),
            _ => Ok(message),
        }
    }

    /// Sends a private message from `source` to `target`, provisioning
    /// the private-channel pair on demand.
    pub fn send_private(
        &self,
        source: &Chatter,
        target: &Chatter,
        text: &str,
    ) -> Result<Message, ChatError> {
        let message = source.message(text).to_chatter(target).build();
        let event = self.events.post(SendMessageEvent::new(message.clone()));
        if event.is_cancelled() {
            return Err(ChatError::Rejected);
        }
        self.deliver_private(source, target, &message)
    }

    fn deliver_private(
        &self,
        source: &Chatter,
        target: &Chatter,
        message: &Message,
    ) -> Result<Message, ChatError> {
        let outgoing = self.provision_private_channels(source, target)?;
        match outgoing.send_message(message) {
            Delivery::Rejected => Err(ChatError::Rejected),
            _ => Ok(message.clone()),
        }
    }

    /// The pairing protocol. Idempotent: re-sends between the same pair
    /// reuse both channels and their history.
    ///
    /// The outgoing channel is keyed by the recipient's id, the reverse
    /// channel by the sender's id; the two are cross-linked as mutual
    /// targets so a delivery into either propagates to the other (the
    /// channel history dedup stops the forwarding cycle). Each party is
    /// joined into the channel they read, bypassing the member-only join
    /// gate that keeps third parties out.
    fn provision_private_channels(
        &self,
        source: &Chatter,
        target: &Chatter,
    ) -> Result<Channel, ChatError> {
        let outgoing = self.private_channel_keyed_by(target)?;
        let incoming = self.private_channel_keyed_by(source)?;
        outgoing.targets().add(Arc::new(incoming.clone()));
        incoming.targets().add(Arc::new(outgoing.clone()));
        source.join(&outgoing);
        target.join(&incoming);
        Ok(outgoing)
    }

    fn private_channel_keyed_by(&self, partner: &Chatter) -> Result<Channel, ChatError> {
        let key = partner.id().to_string();
        self.channels.find_or_create(&key, &|| {
            let builder = (self.private_template)(
                Channel::builder(key.clone()).events(self.events.clone()),
            );
            let channel = builder
                .set(&DISPLAY_NAME, partner.display_name().to_string())
                .build()?;
            debug!(channel = %channel.key(), "provisioned private channel");
            Ok(channel)
        })
    }

    fn registered_chatter(&self, id: Uuid) -> Result<Chatter, ChatError> {
        self.chatters.get(&id)
    }
}

/// The `(source, recipient)` pair of a direct message: present when the
/// target set is exactly one chatter differing from the message source.
fn private_route(event: &SendMessageEvent) -> Option<(Uuid, Uuid)> {
    let entries = event.targets().entries();
    if entries.len() != 1 {
        return None;
    }
    let TargetKey::Chatter(recipient) = entries[0].target_key() else {
        return None;
    };
    let source = event.message().source().map(Identity::id)?;
    (source != recipient).then_some((source, recipient))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::templates;
    use crate::domain::entities::channel::PRIVATE;
    use crate::domain::pointer::Configured;
    use crate::domain::repository::Repository;
    use crate::infrastructure::repositories::{
        InMemoryChannelRepository, InMemoryChatterRepository,
    };
    use pretty_assertions::assert_eq;

    struct Fixture {
        channels: Arc<InMemoryChannelRepository>,
        chatters: Arc<InMemoryChatterRepository>,
        events: EventBus,
        service: MessageService,
    }

    fn fixture() -> Fixture {
        let channels = Arc::new(InMemoryChannelRepository::new());
        let chatters = Arc::new(InMemoryChatterRepository::new());
        let events = EventBus::new();
        let service = MessageService::new(
            channels.clone(),
            chatters.clone(),
            events.clone(),
            templates::private_channel(),
        );
        Fixture {
            channels,
            chatters,
            events,
            service,
        }
    }

    fn chatter(name: &str) -> Chatter {
        Chatter::builder(Identity::new(name)).build()
    }

    // ==================== chat ====================

    #[test]
    fn test_chat_without_active_channel_fails() {
        let fixture = fixture();
        let bob = chatter("Bob");
        assert_eq!(
            fixture.service.chat(&bob, "hi").unwrap_err(),
            ChatError::NoActiveChannel
        );
        assert!(bob.messages().is_empty());
    }

    #[test]
    fn test_chat_delivers_into_the_active_channel() {
        let fixture = fixture();
        let bob = chatter("Bob");
        let town = Channel::builder("town").build().unwrap();
        bob.join(&town);
        bob.set_active_channel(&town);

        let message = fixture.service.chat(&bob, "hi").unwrap();

        assert_eq!(message.source(), Some(bob.identity()));
        assert!(town.messages().contains(&message));
        assert!(bob.messages().contains(&message));
    }

    // ==================== send ====================

    #[test]
    fn test_cancelled_send_delivers_nothing() {
        let fixture = fixture();
        fixture
            .events
            .on::<SendMessageEvent, _>(|event| event.cancel());
        let bob = chatter("Bob");

        let draft = Message::draft().text("hi").to_chatter(&bob);
        assert_eq!(fixture.service.send(draft).unwrap_err(), ChatError::Rejected);
        assert!(bob.messages().is_empty());
    }

    #[test]
    fn test_sourceless_single_chatter_send_is_a_plain_broadcast() {
        let fixture = fixture();
        let bob = chatter("Bob");

        let draft = Message::draft().text("announcement").to_chatter(&bob);
        let message = fixture.service.send(draft).unwrap();

        assert!(bob.messages().contains(&message));
        assert!(fixture.channels.keys().is_empty());
    }

    #[test]
    fn test_single_foreign_chatter_target_routes_privately() {
        let fixture = fixture();
        let alice = chatter("Alice");
        let bob = chatter("Bob");
        fixture.chatters.add(alice.clone()).unwrap();
        fixture.chatters.add(bob.clone()).unwrap();

        let draft = alice.message("psst").to_chatter(&bob);
        let message = fixture.service.send(draft).unwrap();

        assert!(bob.messages().contains(&message));
        assert!(fixture.channels.contains_key(&bob.id().to_string()));
        assert!(fixture.channels.contains_key(&alice.id().to_string()));
    }

    #[test]
    fn test_unregistered_recipient_fails_the_private_route() {
        let fixture = fixture();
        let alice = chatter("Alice");
        let bob = chatter("Bob");
        fixture.chatters.add(alice.clone()).unwrap();

        let draft = alice.message("psst").to_chatter(&bob);
        assert_eq!(
            fixture.service.send(draft).unwrap_err(),
            ChatError::ChatterNotFound(bob.id().to_string())
        );
    }

    // ==================== private channels ====================

    #[test]
    fn test_private_send_reaches_both_parties() {
        let fixture = fixture();
        let alice = chatter("Alice");
        let bob = chatter("Bob");

        let message = fixture.service.send_private(&alice, &bob, "psst").unwrap();

        assert!(alice.messages().contains(&message));
        assert!(bob.messages().contains(&message));
    }

    #[test]
    fn test_private_channels_are_reused_across_sends() {
        let fixture = fixture();
        let alice = chatter("Alice");
        let bob = chatter("Bob");

        fixture.service.send_private(&alice, &bob, "one").unwrap();
        let outgoing = fixture
            .channels
            .get(&bob.id().to_string())
            .unwrap();
        let reverse = fixture
            .channels
            .get(&alice.id().to_string())
            .unwrap();

        fixture.service.send_private(&alice, &bob, "two").unwrap();

        let mut keys = fixture.channels.keys();
        keys.sort();
        let mut expected = vec![alice.id().to_string(), bob.id().to_string()];
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(outgoing.messages().len(), 2);
        assert!(outgoing.is(&PRIVATE));
        assert!(reverse.is(&PRIVATE));
    }

    #[test]
    fn test_replies_flow_back_through_the_same_pair() {
        let fixture = fixture();
        let alice = chatter("Alice");
        let bob = chatter("Bob");

        fixture.service.send_private(&alice, &bob, "ping").unwrap();
        let reply = fixture.service.send_private(&bob, &alice, "pong").unwrap();

        assert!(alice.messages().contains(&reply));
        assert_eq!(fixture.channels.all().len(), 2);
    }

    #[test]
    fn test_private_channel_display_name_follows_the_recipient() {
        let fixture = fixture();
        let alice = chatter("Alice");
        let bob = chatter("Bob");

        fixture.service.send_private(&alice, &bob, "hi").unwrap();

        let outgoing = fixture.channels.get(&bob.id().to_string()).unwrap();
        assert_eq!(outgoing.display_name(), "Bob");
    }
}
