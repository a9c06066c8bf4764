//! Repository Contracts
//!
//! Keyed stores for the domain entities. Implementations live in the
//! infrastructure layer; the domain and application layers only see
//! these traits.

use uuid::Uuid;

use crate::domain::entities::channel::Channel;
use crate::domain::entities::chatter::Chatter;
use crate::shared::error::ChatError;

/// A keyed entity store.
pub trait Repository<K, E>: Send + Sync {
    /// All stored entities, in no particular order.
    fn all(&self) -> Vec<E>;

    /// All keys, in no particular order.
    fn keys(&self) -> Vec<K>;

    fn contains_key(&self, key: &K) -> bool;

    /// The entity under `key`, if any.
    fn find(&self, key: &K) -> Option<E>;

    /// The entity under `key`, or the store's not-found error.
    fn get(&self, key: &K) -> Result<E, ChatError>;

    /// Compare-and-insert: fails with the store's duplicate error when the
    /// key is already taken, leaving the existing entity untouched.
    fn add(&self, entity: E) -> Result<(), ChatError>;

    /// Removes and returns the entity under `key`.
    fn remove(&self, key: &K) -> Option<E>;
}

/// The channel store. Channels are keyed by their immutable key.
pub trait ChannelRepository: Repository<String, Channel> {
    /// Atomically returns the channel under `key` or creates, registers
    /// and returns a new one. A failing `create` registers nothing.
    fn find_or_create(
        &self,
        key: &str,
        create: &dyn Fn() -> Result<Channel, ChatError>,
    ) -> Result<Channel, ChatError>;
}

/// The chatter store, keyed by identity id.
pub trait ChatterRepository: Repository<Uuid, Chatter> {}

/// Fire-and-forget persistence of a chatter's state (active channel and
/// memberships). The storage format belongs to the host platform; the
/// engine only triggers the round-trip.
pub trait ChatterStore: Send + Sync {
    fn save(&self, chatter: &Chatter);
    fn load(&self, chatter: &Chatter);
}
