//! Application Error Types
//!
//! Centralized error taxonomy for the routing engine.
//!
//! Command paths (join, leave, chat, send) return `Result<_, ChatError>` and
//! guarantee that an `Err` means "no delivery / no mutation occurred"; any
//! compensating rollback has already run before the error surfaces. Pure
//! query paths (`get`, `get_or_default`) never return errors and always
//! substitute an absent-safe value.

/// Routing engine error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// A channel key failed validation at construction time.
    /// No partially-valid channel is ever observable.
    #[error("invalid channel key: '{0}'")]
    InvalidKey(String),

    /// A join, leave or send was denied by a policy or vetoed by an
    /// event listener.
    #[error("access to channel '{0}' denied")]
    AccessDenied(String),

    /// A chat message was sent without an active channel selected.
    #[error("no active channel")]
    NoActiveChannel,

    /// A channel with the same key already exists in the repository.
    /// The caller's reference to the pre-existing channel is unaffected.
    #[error("a channel with key '{0}' already exists")]
    DuplicateChannel(String),

    /// A repository lookup by key found nothing. Distinct from
    /// [`ChatError::AccessDenied`]: absence, not prohibition.
    #[error("channel '{0}' not found")]
    ChannelNotFound(String),

    /// A chatter lookup by id found nothing.
    #[error("chatter '{0}' not found")]
    ChatterNotFound(String),

    /// A chatter with the same identity id is already registered.
    #[error("a chatter with id '{0}' already exists")]
    DuplicateChatter(String),

    /// A leave was requested for a channel the chatter is not a member of.
    #[error("not a member of channel '{0}'")]
    NotJoined(String),

    /// Message delivery was rejected by the target's send pipeline.
    #[error("message delivery was rejected")]
    Rejected,
}
