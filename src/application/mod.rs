//! Application Layer
//!
//! The command pipeline orchestrating policy checks, event emission and
//! state mutation over the domain graph.

pub mod services;

pub use services::{ChannelService, MessageService};
