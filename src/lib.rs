//! # Chat Router Library
//!
//! This crate provides the chat-routing core for a multiplayer game server:
//! - Typed attribute resolution (pointers and settings) configuring every
//!   channel and message target
//! - A message-routing and membership engine with at-most-once delivery
//!   and chronological history
//! - A cancellable-event command pipeline with pluggable join/leave/send
//!   policies
//! - On-demand private-channel provisioning between chatters
//!
//! Host-platform concerns (permission backends, rendering, persistence
//! formats, cross-server replication) stay outside; the crate exposes
//! seams for them: the permission closure and [`ViewConnector`] on
//! chatters, and the [`ChatterStore`] persistence trait.
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: The pointer system, entities, events and policies
//! - **Application Layer**: The command-pipeline services
//! - **Infrastructure Layer**: In-memory repositories and persistence
//!
//! ## Module Structure
//!
//! ```text
//! chat_router/
//! +-- config/        Channel templates (composable prototypes)
//! +-- domain/        Pointer system, entities, value objects, events, policies
//! +-- application/   Membership and message-routing services
//! +-- infrastructure/ In-memory repositories, no-op persistence
//! +-- shared/        Common utilities (errors, validation)
//! ```
//!
//! [`ViewConnector`]: domain::entities::chatter::ViewConnector
//! [`ChatterStore`]: domain::repository::ChatterStore

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Command pipeline services
pub mod application;

// Infrastructure layer - In-memory implementations
pub mod infrastructure;

// Shared utilities
pub mod shared;

// Telemetry and observability
pub mod telemetry;

pub use application::{ChannelService, MessageService};
pub use domain::entities::{Channel, Chatter, Draft, Message, MessageKind, ViewConnector};
pub use domain::events::EventBus;
pub use domain::pointer::{Configured, Pointer, Pointered, Pointers, Setting, Settings};
pub use domain::repository::{ChannelRepository, ChatterRepository, ChatterStore, Repository};
pub use domain::value_objects::{Delivery, Identity, MessageTarget, TargetKey, Targets};
pub use shared::error::ChatError;
