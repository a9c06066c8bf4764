//! Configuration
//!
//! Startup-time wiring values: channel templates composed once and handed
//! to the services that create channels.

pub mod templates;

pub use templates::{base, compose, private_channel, template, ChannelTemplate};
