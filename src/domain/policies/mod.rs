//! Access Policies
//!
//! Pluggable boolean predicates gating membership changes and message
//! delivery. Policies are plain configuration: each channel resolves its
//! policies through the settings system ([`JOIN_POLICY`], [`LEAVE_POLICY`],
//! [`SEND_POLICY`]), so they can be swapped per channel without the channel
//! knowing any policy internals.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::domain::entities::channel::{Channel, FORCED, JOIN_PERMISSION, PRIVATE, PROTECTED};
use crate::domain::entities::chatter::Chatter;
use crate::domain::entities::message::Message;
use crate::domain::pointer::{Configured, Setting};
use crate::domain::value_objects::TargetKey;

/// The policy gating a channel join.
pub static JOIN_POLICY: Lazy<Setting<JoinPolicy>> =
    Lazy::new(|| Setting::new("join_policy", JoinPolicy::default()));

/// The policy gating a channel leave.
pub static LEAVE_POLICY: Lazy<Setting<LeavePolicy>> =
    Lazy::new(|| Setting::new("leave_policy", LeavePolicy::default()));

/// The policy gating message delivery through a channel.
pub static SEND_POLICY: Lazy<Setting<SendPolicy>> =
    Lazy::new(|| Setting::new("send_policy", SendPolicy::default()));

/// Decides whether a chatter may join a channel.
#[derive(Clone)]
pub struct JoinPolicy {
    check: Arc<dyn Fn(&Chatter, &Channel) -> bool + Send + Sync>,
}

impl JoinPolicy {
    pub fn new(check: impl Fn(&Chatter, &Channel) -> bool + Send + Sync + 'static) -> Self {
        Self {
            check: Arc::new(check),
        }
    }

    pub fn allow() -> Self {
        Self::new(|_, _| true)
    }

    pub fn deny() -> Self {
        Self::new(|_, _| false)
    }

    /// The standard policy: unprotected channels are open to everyone,
    /// protected channels require the channel's join permission.
    pub fn protected_channels() -> Self {
        Self::new(|chatter, channel| {
            !channel.is(&PROTECTED) || chatter.has_permission(&channel.get(&JOIN_PERMISSION))
        })
    }

    /// The private-channel policy: only chatters that are already members
    /// may join. Non-private channels stay open.
    pub fn private_members_only() -> Self {
        Self::new(|chatter, channel| {
            !channel.is(&PRIVATE)
                || channel
                    .targets()
                    .contains(&TargetKey::Chatter(chatter.id()))
        })
    }

    pub fn test(&self, chatter: &Chatter, channel: &Channel) -> bool {
        (self.check)(chatter, channel)
    }
}

impl Default for JoinPolicy {
    fn default() -> Self {
        Self::protected_channels()
    }
}

impl fmt::Debug for JoinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JoinPolicy(..)")
    }
}

/// Decides whether a chatter may leave a channel.
#[derive(Clone)]
pub struct LeavePolicy {
    check: Arc<dyn Fn(&Chatter, &Channel) -> bool + Send + Sync>,
}

impl LeavePolicy {
    pub fn new(check: impl Fn(&Chatter, &Channel) -> bool + Send + Sync + 'static) -> Self {
        Self {
            check: Arc::new(check),
        }
    }

    pub fn allow() -> Self {
        Self::new(|_, _| true)
    }

    pub fn deny() -> Self {
        Self::new(|_, _| false)
    }

    pub fn test(&self, chatter: &Chatter, channel: &Channel) -> bool {
        (self.check)(chatter, channel)
    }
}

impl Default for LeavePolicy {
    /// Leaving is free unless the channel membership is forced.
    fn default() -> Self {
        Self::new(|_, channel| !channel.is(&FORCED))
    }
}

impl fmt::Debug for LeavePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LeavePolicy(..)")
    }
}

/// Decides whether a message may be forwarded through a channel.
#[derive(Clone)]
pub struct SendPolicy {
    check: Arc<dyn Fn(&Channel, &Message) -> bool + Send + Sync>,
}

impl SendPolicy {
    pub fn new(check: impl Fn(&Channel, &Message) -> bool + Send + Sync + 'static) -> Self {
        Self {
            check: Arc::new(check),
        }
    }

    pub fn allow() -> Self {
        Self::new(|_, _| true)
    }

    pub fn deny() -> Self {
        Self::new(|_, _| false)
    }

    /// The cross-link aware policy used by private channels: the source
    /// must be a member of this channel or of a channel that is linked as
    /// a target of this channel, so forwarded private messages pass the
    /// protection gate on the partner channel.
    pub fn linked_members_only() -> Self {
        Self::new(|channel, message| match message.source() {
            None => true,
            Some(source) if source.is_nil() => true,
            Some(source) => {
                let key = TargetKey::Chatter(source.id());
                channel.targets().contains(&key)
                    || channel.targets().channels().iter().any(|linked| {
                        linked
                            .as_any()
                            .downcast_ref::<Channel>()
                            .is_some_and(|c| c.targets().contains(&key))
                    })
            }
        })
    }

    pub fn test(&self, channel: &Channel, message: &Message) -> bool {
        (self.check)(channel, message)
    }
}

impl Default for SendPolicy {
    /// Sourceless messages always pass; sourced messages pass unless the
    /// channel is protected and the source is not a member.
    fn default() -> Self {
        Self::new(|channel, message| match message.source() {
            None => true,
            Some(source) if source.is_nil() => true,
            Some(source) => {
                !channel.is(&PROTECTED)
                    || channel
                        .targets()
                        .contains(&TargetKey::Chatter(source.id()))
            }
        })
    }
}

impl fmt::Debug for SendPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SendPolicy(..)")
    }
}
