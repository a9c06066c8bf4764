//! Value Objects
//!
//! Identity, delivery targets and message history. These types carry no
//! behaviour beyond their own invariants and are shared freely between
//! entities.

pub mod identity;
pub mod messages;
pub mod targets;

pub use identity::Identity;
pub use messages::Messages;
pub use targets::{Delivery, MessageTarget, TargetKey, Targets};
