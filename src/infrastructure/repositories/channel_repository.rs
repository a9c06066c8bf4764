//! In-Memory Channel Repository

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::entities::channel::Channel;
use crate::domain::repository::{ChannelRepository, Repository};
use crate::shared::error::ChatError;

/// A concurrent, in-process channel store keyed by channel key.
#[derive(Default)]
pub struct InMemoryChannelRepository {
    channels: DashMap<String, Channel>,
}

impl InMemoryChannelRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository<String, Channel> for InMemoryChannelRepository {
    fn all(&self) -> Vec<Channel> {
        self.channels.iter().map(|entry| entry.value().clone()).collect()
    }

    fn keys(&self) -> Vec<String> {
        self.channels.iter().map(|entry| entry.key().clone()).collect()
    }

    fn contains_key(&self, key: &String) -> bool {
        self.channels.contains_key(key)
    }

    fn find(&self, key: &String) -> Option<Channel> {
        self.channels.get(key).map(|entry| entry.value().clone())
    }

    fn get(&self, key: &String) -> Result<Channel, ChatError> {
        self.find(key).ok_or_else(|| ChatError::ChannelNotFound(key.clone()))
    }

    fn add(&self, channel: Channel) -> Result<(), ChatError> {
        match self.channels.entry(channel.key().to_string()) {
            Entry::Occupied(_) => Err(ChatError::DuplicateChannel(channel.key().to_string())),
            Entry::Vacant(slot) => {
                debug!(channel = %channel.key(), "registered channel");
                slot.insert(channel);
                Ok(())
            }
        }
    }

    fn remove(&self, key: &String) -> Option<Channel> {
        let removed = self.channels.remove(key).map(|(_, channel)| channel);
        if removed.is_some() {
            debug!(channel = %key, "removed channel");
        }
        removed
    }
}

impl ChannelRepository for InMemoryChannelRepository {
    fn find_or_create(
        &self,
        key: &str,
        create: &dyn Fn() -> Result<Channel, ChatError>,
    ) -> Result<Channel, ChatError> {
        // The entry is held across create() so a concurrent call for the
        // same key cannot register a second channel.
        match self.channels.entry(key.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(slot) => {
                let channel = create()?;
                debug!(channel = %channel.key(), "registered channel");
                slot.insert(channel.clone());
                Ok(channel)
            }
        }
    }
}
