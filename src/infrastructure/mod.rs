//! Infrastructure Layer
//!
//! Concrete implementations of the domain's repository and persistence
//! contracts: in-memory stores for channels and chatters.

pub mod persistence;
pub mod repositories;

pub use persistence::NoopChatterStore;
pub use repositories::{InMemoryChannelRepository, InMemoryChatterRepository};
