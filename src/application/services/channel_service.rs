//! Channel Service
//!
//! The policy- and event-gated membership pipeline: join, leave and
//! active-channel selection. Every command either completes fully or
//! leaves the membership graph untouched (after compensating rollback),
//! so callers never observe a half-applied state.

use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::channel::{Channel, AUTO_JOIN};
use crate::domain::entities::chatter::Chatter;
use crate::domain::events::{
    Cancellable, ChatterJoinedChannelEvent, ChatterLeftChannelEvent, EventBus, JoinChannelEvent,
    LeaveChannelEvent,
};
use crate::domain::pointer::Configured;
use crate::domain::policies::{JOIN_POLICY, LEAVE_POLICY};
use crate::domain::repository::{ChannelRepository, ChatterStore};
use crate::shared::error::ChatError;

/// Orchestrates membership changes between chatters and channels.
pub struct ChannelService {
    events: EventBus,
    store: Arc<dyn ChatterStore>,
}

impl ChannelService {
    pub fn new(events: EventBus, store: Arc<dyn ChatterStore>) -> Self {
        Self { events, store }
    }

    /// Joins `chatter` into `channel`.
    ///
    /// The channel's join policy is resolved and posted with a cancellable
    /// [`JoinChannelEvent`]; listeners may veto or substitute the policy.
    /// On veto or denial the chatter is synchronously removed from the
    /// channel, so even a stale prior membership is cleaned up before
    /// [`ChatError::AccessDenied`] surfaces. Joining a channel the chatter
    /// is already a member of succeeds silently without a post-event.
    pub fn join(&self, chatter: &Chatter, channel: &Channel) -> Result<(), ChatError> {
        let event = self.events.post(JoinChannelEvent::new(
            chatter.clone(),
            channel.clone(),
            channel.get(&JOIN_POLICY),
        ));
        if event.is_cancelled() || !event.policy().test(chatter, channel) {
            chatter.leave(channel);
            debug!(chatter = %chatter.name(), channel = %channel.key(), "join denied");
            return Err(ChatError::AccessDenied(channel.key().to_string()));
        }
        if chatter.is_joined(channel) {
            return Ok(());
        }

        chatter.join(channel);
        self.events.post(ChatterJoinedChannelEvent {
            chatter: chatter.clone(),
            channel: channel.clone(),
        });
        chatter.update_view();
        self.store.save(chatter);
        debug!(chatter = %chatter.name(), channel = %channel.key(), "joined channel");
        Ok(())
    }

    /// Removes `chatter` from `channel`.
    ///
    /// Leaving a channel the chatter is not a member of fails with
    /// [`ChatError::NotJoined`] without side effects. Otherwise the
    /// resolved leave policy runs through a cancellable
    /// [`LeaveChannelEvent`]; a veto or denial leaves membership
    /// untouched.
    pub fn leave(&self, chatter: &Chatter, channel: &Channel) -> Result<(), ChatError> {
        if !chatter.is_joined(channel) {
            return Err(ChatError::NotJoined(channel.key().to_string()));
        }
        let event = self.events.post(LeaveChannelEvent::new(
            chatter.clone(),
            channel.clone(),
            channel.get(&LEAVE_POLICY),
        ));
        if event.is_cancelled() || !event.policy().test(chatter, channel) {
            debug!(chatter = %chatter.name(), channel = %channel.key(), "leave denied");
            return Err(ChatError::AccessDenied(channel.key().to_string()));
        }

        chatter.leave(channel);
        self.events.post(ChatterLeftChannelEvent {
            chatter: chatter.clone(),
            channel: channel.clone(),
        });
        chatter.update_view();
        self.store.save(chatter);
        debug!(chatter = %chatter.name(), channel = %channel.key(), "left channel");
        Ok(())
    }

    /// Joins `chatter` into every auto-join channel of `channels`, e.g. on
    /// login. Each join runs the full policy and event gate; a channel that
    /// denies the join is skipped without failing the rest.
    pub fn join_auto_channels(&self, chatter: &Chatter, channels: &dyn ChannelRepository) {
        for channel in channels.all() {
            if !channel.is(&AUTO_JOIN) {
                continue;
            }
            if self.join(chatter, &channel).is_err() {
                debug!(chatter = %chatter.name(), channel = %channel.key(), "auto-join skipped");
            }
        }
    }

    /// Makes `channel` the chatter's active channel, joining it first.
    /// A failing join propagates unchanged and the active channel stays
    /// as it was.
    pub fn set_active_channel(&self, chatter: &Chatter, channel: &Channel) -> Result<(), ChatError> {
        self.join(chatter, channel)?;
        chatter.set_active_channel(channel);
        chatter.update_view();
        self.store.save(chatter);
        Ok(())
    }
}
