//! Identity Value Object
//!
//! Who a message or chatter is. Identity equality follows the id alone, so
//! a renamed player is still the same identity.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pointer::{Pointer, Pointered, Pointers};

/// The id of an identity.
pub static ID: Lazy<Pointer<Uuid>> = Lazy::new(|| Pointer::new("id"));

/// The immutable account name of an identity.
pub static NAME: Lazy<Pointer<String>> = Lazy::new(|| Pointer::new("name"));

/// The presentation name of an identity, e.g. a nickname.
pub static DISPLAY_NAME: Lazy<Pointer<String>> = Lazy::new(|| Pointer::new("display_name"));

/// The identity of a chatter or message source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    id: Uuid,
    name: String,
    display_name: String,
}

impl Identity {
    /// Creates an identity with a fresh id. The display name starts out
    /// equal to the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            display_name: name.clone(),
            name,
        }
    }

    /// Creates an identity with a known id, e.g. one loaded from storage.
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            display_name: name.clone(),
            name,
        }
    }

    /// The nil identity, used for system messages without a source.
    pub fn nil() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            display_name: String::new(),
        }
    }

    /// Replaces the display name.
    pub fn rename(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether this is the nil identity.
    pub fn is_nil(&self) -> bool {
        self.id.is_nil()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

impl std::hash::Hash for Identity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Pointered for Identity {
    fn pointers(&self) -> Pointers {
        Pointers::builder()
            .with_static(&ID, self.id)
            .with_static(&NAME, self.name.clone())
            .with_static(&DISPLAY_NAME, self.display_name.clone())
            .build()
    }
}
