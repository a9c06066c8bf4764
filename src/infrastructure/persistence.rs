//! Chatter Persistence
//!
//! The engine only triggers save/load round-trips; the storage format is
//! owned by the host platform. [`NoopChatterStore`] serves tests and
//! hosts without persistence.

use crate::domain::entities::chatter::Chatter;
use crate::domain::repository::ChatterStore;

/// A store that persists nothing.
#[derive(Debug, Default)]
pub struct NoopChatterStore;

impl ChatterStore for NoopChatterStore {
    fn save(&self, _chatter: &Chatter) {}

    fn load(&self, _chatter: &Chatter) {}
}
