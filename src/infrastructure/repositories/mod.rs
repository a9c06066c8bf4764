//! In-Memory Repositories

pub mod channel_repository;
pub mod chatter_repository;

pub use channel_repository::InMemoryChannelRepository;
pub use chatter_repository::InMemoryChatterRepository;
