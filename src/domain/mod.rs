//! Domain Layer
//!
//! The routing engine's core: the pointer/settings attribute-resolution
//! system, the entity graph of channels, chatters and messages, the
//! synchronous event bus, and the pluggable access policies.

pub mod entities;
pub mod events;
pub mod pointer;
pub mod policies;
pub mod repository;
pub mod value_objects;
