//! Settings: pointers with an intrinsic default value.

use std::fmt;

use super::pointer::{Pointer, PointerKey};

/// A [`Pointer`] with a default value.
///
/// Settings back anything configurable. Each distinct configurable property
/// is created once and shared as a constant (see the channel settings in
/// [`crate::domain::entities::channel`]).
#[derive(Clone)]
pub struct Setting<V> {
    pointer: Pointer<V>,
    default: V,
}

impl<V: Clone + Send + Sync + 'static> Setting<V> {
    /// Creates a setting under the given key with the given default.
    pub fn new(key: impl Into<String>, default: V) -> Self {
        Self {
            pointer: Pointer::new(key),
            default,
        }
    }

    /// The string key of this setting.
    pub fn key(&self) -> &str {
        self.pointer.key()
    }

    /// The underlying pointer identity.
    pub fn pointer(&self) -> &Pointer<V> {
        &self.pointer
    }

    /// The type-erased identity of the underlying pointer.
    pub fn erased(&self) -> PointerKey {
        self.pointer.erased()
    }

    /// The default value used when the setting is not set.
    pub fn default_value(&self) -> V {
        self.default.clone()
    }
}

impl<V> PartialEq for Setting<V> {
    fn eq(&self, other: &Self) -> bool {
        self.pointer == other.pointer
    }
}

impl<V> Eq for Setting<V> {}

impl<V: fmt::Debug + 'static> fmt::Debug for Setting<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("key", &self.pointer.key())
            .field("default", &self.default)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_setting_exposes_key_and_default() {
        let setting = Setting::new("priority", 100);
        assert_eq!(setting.key(), "priority");
        assert_eq!(setting.default_value(), 100);
    }

    #[test]
    fn test_settings_with_same_key_are_equal_regardless_of_default() {
        let a = Setting::new("priority", 100);
        let b = Setting::new("priority", 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_setting_identity_matches_its_pointer() {
        let setting = Setting::new("priority", 100);
        let pointer: Pointer<i32> = Pointer::new("priority");
        assert_eq!(setting.erased(), pointer.erased());
    }
}
