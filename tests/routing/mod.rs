//! End-to-End Routing Scenarios

use chat_router::domain::entities::channel::PROTECTED;
use chat_router::domain::entities::message::MessageKind;
use chat_router::domain::events::{Cancellable, ChannelMessageEvent};
use chat_router::domain::pointer::Configured;
use chat_router::domain::repository::Repository;
use chat_router::domain::value_objects::MessageTarget;
use chat_router::ChatError;

use crate::common::TestEngine;

#[test]
fn chatting_requires_an_active_channel() {
    let engine = TestEngine::new();
    let alice = engine.chatter("Alice");
    let town = engine.channel("town");

    assert_eq!(
        engine.message_service.chat(&alice, "hi"),
        Err(ChatError::NoActiveChannel)
    );
    assert!(town.messages().is_empty());

    engine.channel_service.set_active_channel(&alice, &town).unwrap();
    assert!(town.targets().contains(&alice.target_key()));
    assert!(alice.channels().contains(&town));

    let message = engine.message_service.chat(&alice, "hi").unwrap();
    assert_eq!(message.source(), Some(alice.identity()));
    assert_eq!(message.kind(), MessageKind::Chat);
    assert!(town.messages().contains(&message));
    assert!(alice.messages().contains(&message));
}

#[test]
fn denied_join_cleans_up_even_a_stale_membership() {
    let engine = TestEngine::new();
    let bob = engine.restricted_chatter("Bob");
    let vip = engine.channel("vip");
    vip.set(&PROTECTED, true);

    // a stale entry, e.g. restored from an outdated save
    bob.join(&vip);

    assert_eq!(
        engine.channel_service.join(&bob, &vip),
        Err(ChatError::AccessDenied("vip".to_string()))
    );
    assert!(!vip.targets().contains(&bob.target_key()));
    assert!(!bob.channels().contains(&vip));
}

#[test]
fn channel_messages_reach_every_member() {
    let engine = TestEngine::new();
    let alice = engine.chatter("Alice");
    let bob = engine.chatter("Bob");
    let town = engine.channel("town");
    engine.channel_service.set_active_channel(&alice, &town).unwrap();
    engine.channel_service.join(&bob, &town).unwrap();

    let message = engine.message_service.chat(&alice, "hello everyone").unwrap();

    assert!(alice.messages().contains(&message));
    assert!(bob.messages().contains(&message));
}

#[test]
fn members_leaving_stop_receiving() {
    let engine = TestEngine::new();
    let alice = engine.chatter("Alice");
    let bob = engine.chatter("Bob");
    let town = engine.channel("town");
    engine.channel_service.set_active_channel(&alice, &town).unwrap();
    engine.channel_service.join(&bob, &town).unwrap();
    engine.channel_service.leave(&bob, &town).unwrap();

    engine.message_service.chat(&alice, "anyone here?").unwrap();

    assert!(bob.messages().is_empty());
}

#[test]
fn private_sends_reuse_the_same_channel_pair() {
    let engine = TestEngine::new();
    let alice = engine.chatter("Alice");
    let bob = engine.chatter("Bob");

    engine.message_service.send_private(&alice, &bob, "one").unwrap();

    let outgoing_key = bob.id().to_string();
    let reverse_key = alice.id().to_string();
    assert!(engine.channels.contains_key(&outgoing_key));
    assert!(engine.channels.contains_key(&reverse_key));
    let outgoing = engine.channels.get(&outgoing_key).unwrap();
    let reverse = engine.channels.get(&reverse_key).unwrap();

    engine.message_service.send_private(&alice, &bob, "two").unwrap();

    // still the same two channels, with accumulated history
    assert_eq!(engine.channels.all().len(), 2);
    assert_eq!(engine.channels.get(&outgoing_key).unwrap(), outgoing);
    assert_eq!(engine.channels.get(&reverse_key).unwrap(), reverse);
    assert_eq!(outgoing.messages().len(), 2);
    assert_eq!(bob.messages().len(), 2);
}

#[test]
fn private_replies_arrive_in_the_senders_channel() {
    let engine = TestEngine::new();
    let alice = engine.chatter("Alice");
    let bob = engine.chatter("Bob");

    engine.message_service.send_private(&alice, &bob, "ping").unwrap();
    let reply = engine.message_service.send_private(&bob, &alice, "pong").unwrap();

    // the reply propagates over the cross-link into the channel alice reads
    let alices_channel = engine.channels.get(&alice.id().to_string()).unwrap();
    assert!(alices_channel.messages().contains(&reply));
    assert!(alice.messages().contains(&reply));
    assert_eq!(engine.channels.all().len(), 2);
}

#[test]
fn a_message_addressed_to_one_chatter_goes_private() {
    let engine = TestEngine::new();
    let alice = engine.chatter("Alice");
    let bob = engine.chatter("Bob");

    let draft = alice.message("psst").to_chatter(&bob);
    let message = engine.message_service.send(draft).unwrap();

    assert!(bob.messages().contains(&message));
    assert!(engine.channels.contains_key(&bob.id().to_string()));
}

#[test]
fn third_parties_cannot_join_a_private_channel() {
    let engine = TestEngine::new();
    let alice = engine.chatter("Alice");
    let bob = engine.chatter("Bob");
    let eve = engine.chatter("Eve");

    engine.message_service.send_private(&alice, &bob, "secret").unwrap();

    let channel = engine.channels.get(&bob.id().to_string()).unwrap();
    assert_eq!(
        engine.channel_service.join(&eve, &channel),
        Err(ChatError::AccessDenied(channel.key().to_string()))
    );
    assert!(!channel.targets().contains(&eve.target_key()));
}

#[test]
fn a_listener_can_veto_delivery_into_a_channel() {
    let engine = TestEngine::new();
    let alice = engine.chatter("Alice");
    let bob = engine.chatter("Bob");
    let town = engine.channel("town");
    engine.channel_service.set_active_channel(&alice, &town).unwrap();
    engine.channel_service.join(&bob, &town).unwrap();

    engine.events.on::<ChannelMessageEvent, _>(|event| {
        if event.message().text().contains("spam") {
            event.cancel();
        }
    });

    assert_eq!(
        engine.message_service.chat(&alice, "buy spam now"),
        Err(ChatError::Rejected)
    );
    assert!(bob.messages().is_empty());

    engine.message_service.chat(&alice, "legitimate news").unwrap();
    assert_eq!(bob.messages().len(), 1);
}
