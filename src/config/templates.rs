//! Channel Templates
//!
//! Composable prototype functions over [`ChannelBuilder`]. A template is
//! an explicit value constructed once at startup and threaded into the
//! services that create channels, so cross-cutting defaults (event-bus
//! wiring, private-channel settings) have no hidden global state and
//! tests can build isolated variants.

use std::sync::Arc;

use crate::domain::entities::channel::{ChannelBuilder, GLOBAL, HIDDEN, PRIVATE, PROTECTED};
use crate::domain::events::EventBus;
use crate::domain::policies::{JoinPolicy, SendPolicy, JOIN_POLICY, SEND_POLICY};

/// A reusable transformation of a channel under construction.
pub type ChannelTemplate = Arc<dyn Fn(ChannelBuilder) -> ChannelBuilder + Send + Sync>;

/// Wraps a closure into a template.
pub fn template(
    apply: impl Fn(ChannelBuilder) -> ChannelBuilder + Send + Sync + 'static,
) -> ChannelTemplate {
    Arc::new(apply)
}

/// A template that leaves the builder untouched.
pub fn identity() -> ChannelTemplate {
    template(|builder| builder)
}

/// The base template: wires every created channel to the shared event bus.
pub fn base(events: EventBus) -> ChannelTemplate {
    template(move |builder| builder.events(events.clone()))
}

/// The private-channel template: global, hidden, protected, joinable only
/// by existing members, and with the cross-link aware send policy so
/// forwarded messages pass the partner channel's protection gate.
pub fn private_channel() -> ChannelTemplate {
    template(|builder| {
        builder
            .set(&GLOBAL, true)
            .set(&PRIVATE, true)
            .set(&HIDDEN, true)
            .set(&PROTECTED, true)
            .set(&JOIN_POLICY, JoinPolicy::private_members_only())
            .set(&SEND_POLICY, SendPolicy::linked_members_only())
    })
}

/// Applies `first`, then `second`. Later templates override earlier
/// bindings for the same setting.
pub fn compose(first: ChannelTemplate, second: ChannelTemplate) -> ChannelTemplate {
    template(move |builder| second(first(builder)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::channel::{Channel, PRIORITY};
    use crate::domain::pointer::Configured;
    use pretty_assertions::assert_eq;

    fn build(template: &ChannelTemplate, key: &str) -> Channel {
        template(Channel::builder(key)).build().unwrap()
    }

    #[test]
    fn test_private_template_flags_the_channel() {
        let channel = build(&private_channel(), "dm");
        assert!(channel.is(&PRIVATE));
        assert!(channel.is(&HIDDEN));
        assert!(channel.is(&PROTECTED));
        assert!(channel.is(&GLOBAL));
    }

    #[test]
    fn test_later_templates_override_earlier_bindings() {
        let low = template(|builder| builder.set(&PRIORITY, 10));
        let high = template(|builder| builder.set(&PRIORITY, 1));

        let channel = build(&compose(low, high), "stack");
        assert_eq!(channel.get(&PRIORITY), 1);
    }

    #[test]
    fn test_base_template_wires_the_event_bus() {
        use crate::domain::events::{Cancellable, ChannelMessageEvent};
        use crate::domain::value_objects::Delivery;

        let events = EventBus::new();
        events.on::<ChannelMessageEvent, _>(|event| event.cancel());
        let channel = build(&base(events), "wired");

        let message = crate::domain::entities::message::Message::draft()
            .text("hi")
            .build();
        assert_eq!(channel.send_message(&message), Delivery::Rejected);
    }
}
