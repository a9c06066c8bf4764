//! Typed, keyed value lookups.
//!
//! A [`Pointer`] is an identity, not a value: it combines a value type `V`
//! and a string key, and is used to look values up in a [`Pointers`]
//! collection. Two pointers are the same pointer exactly when their value
//! type and key match.
//!
//! [`Pointers`]: super::Pointers

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A typed pointer to a resource value.
///
/// The pointer never carries a value itself; it is the lookup key used by
/// [`Pointers`](super::Pointers) and [`Settings`](super::Settings).
pub struct Pointer<V> {
    key: String,
    _value: PhantomData<fn() -> V>,
}

impl<V: 'static> Pointer<V> {
    /// Creates a pointer for the value type `V` under the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            _value: PhantomData,
        }
    }

    /// The string key of this pointer.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The type-erased identity of this pointer, usable as a map key
    /// across pointers of different value types.
    pub fn erased(&self) -> PointerKey {
        PointerKey {
            value_type: TypeId::of::<V>(),
            key: self.key.clone(),
        }
    }
}

impl<V> Clone for Pointer<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            _value: PhantomData,
        }
    }
}

impl<V> PartialEq for Pointer<V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<V> Eq for Pointer<V> {}

impl<V> Hash for Pointer<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<V> fmt::Debug for Pointer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pointer")
            .field("key", &self.key)
            .field("type", &std::any::type_name::<V>())
            .finish()
    }
}

/// The type-erased identity of a [`Pointer`]: `(value type, key)`.
///
/// Equality and hashing follow pointer identity, so a `Pointer<i32>` and a
/// `Pointer<String>` sharing the same textual key map to distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointerKey {
    value_type: TypeId,
    key: String,
}

impl PointerKey {
    /// The string key component.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value type component.
    pub fn value_type(&self) -> TypeId {
        self.value_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pointers_with_same_type_and_key_are_equal() {
        let a: Pointer<i32> = Pointer::new("priority");
        let b: Pointer<i32> = Pointer::new("priority");
        assert_eq!(a, b);
        assert_eq!(a.erased(), b.erased());
    }

    #[test]
    fn test_pointers_with_different_keys_differ() {
        let a: Pointer<i32> = Pointer::new("priority");
        let b: Pointer<i32> = Pointer::new("weight");
        assert_ne!(a, b);
        assert_ne!(a.erased(), b.erased());
    }

    #[test]
    fn test_same_key_different_type_is_a_different_pointer() {
        let int: Pointer<i32> = Pointer::new("value");
        let string: Pointer<String> = Pointer::new("value");
        // The typed pointers cannot even be compared; their erased
        // identities must not collide.
        assert_ne!(int.erased(), string.erased());
        assert_eq!(int.erased().key(), string.erased().key());
    }
}
