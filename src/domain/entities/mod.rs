//! Domain Entities
//!
//! The stateful core objects of the routing engine: channels, chatters
//! and messages. All three are cheap-clone `Arc` handles with identity
//! semantics (key for channels, id for chatters and messages).

pub mod channel;
pub mod chatter;
pub mod message;

pub use channel::{Channel, ChannelBuilder};
pub use chatter::{Chatter, ChatterBuilder, NoView, ViewConnector};
pub use message::{Draft, Message, MessageKind};
