//! In-Memory Chatter Repository

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::chatter::Chatter;
use crate::domain::repository::{ChatterRepository, Repository};
use crate::shared::error::ChatError;

/// A concurrent, in-process chatter store keyed by identity id.
#[derive(Default)]
pub struct InMemoryChatterRepository {
    chatters: DashMap<Uuid, Chatter>,
}

impl InMemoryChatterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository<Uuid, Chatter> for InMemoryChatterRepository {
    fn all(&self) -> Vec<Chatter> {
        self.chatters.iter().map(|entry| entry.value().clone()).collect()
    }

    fn keys(&self) -> Vec<Uuid> {
        self.chatters.iter().map(|entry| *entry.key()).collect()
    }

    fn contains_key(&self, key: &Uuid) -> bool {
        self.chatters.contains_key(key)
    }

    fn find(&self, key: &Uuid) -> Option<Chatter> {
        self.chatters.get(key).map(|entry| entry.value().clone())
    }

    fn get(&self, key: &Uuid) -> Result<Chatter, ChatError> {
        self.find(key)
            .ok_or_else(|| ChatError::ChatterNotFound(key.to_string()))
    }

    fn add(&self, chatter: Chatter) -> Result<(), ChatError> {
        match self.chatters.entry(chatter.id()) {
            Entry::Occupied(_) => Err(ChatError::DuplicateChatter(chatter.id().to_string())),
            Entry::Vacant(slot) => {
                debug!(chatter = %chatter.name(), "registered chatter");
                slot.insert(chatter);
                Ok(())
            }
        }
    }

    fn remove(&self, key: &Uuid) -> Option<Chatter> {
        self.chatters.remove(key).map(|(_, chatter)| chatter)
    }
}

impl ChatterRepository for InMemoryChatterRepository {}
