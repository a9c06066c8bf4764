//! Application Services

pub mod channel_service;
pub mod message_service;

pub use channel_service::ChannelService;
pub use message_service::MessageService;
