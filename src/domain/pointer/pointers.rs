//! Immutable pointer collections.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::pointer::{Pointer, PointerKey};

/// A type-erased resolved value.
pub type BoxedValue = Box<dyn Any + Send + Sync>;

/// A zero-argument resolver producing the current value of a pointer,
/// or `None` if the value is currently absent.
pub(crate) type Resolver = Arc<dyn Fn() -> Option<BoxedValue> + Send + Sync>;

/// An immutable-once-built collection of [`Pointer`] bindings.
///
/// Lookups never fail: an unknown pointer resolves to `None`. Dynamic and
/// forwarded bindings are re-resolved on every lookup, so they always
/// reflect the delegate's *current* value.
///
/// The handle is cheap to clone; all clones share the same snapshot.
#[derive(Clone, Default)]
pub struct Pointers {
    entries: Arc<HashMap<PointerKey, Resolver>>,
}

impl Pointers {
    /// Creates an empty pointer collection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Starts a new builder.
    pub fn builder() -> PointersBuilder {
        PointersBuilder::default()
    }

    /// Copies all current bindings into a new builder, enabling layered
    /// override: later `with_*` calls replace earlier bindings per key.
    pub fn to_builder(&self) -> PointersBuilder {
        PointersBuilder {
            entries: (*self.entries).clone(),
        }
    }

    /// Resolves the current value of `pointer`, or `None` when the pointer
    /// is unbound or its resolver yields nothing.
    pub fn get<V>(&self, pointer: &Pointer<V>) -> Option<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        let resolver = self.entries.get(&pointer.erased())?.clone();
        resolver().and_then(downcast::<V>)
    }

    /// Resolves the current value of `pointer`, substituting `default`
    /// when absent.
    pub fn get_or_default<V>(&self, pointer: &Pointer<V>, default: V) -> V
    where
        V: Clone + Send + Sync + 'static,
    {
        self.get(pointer).unwrap_or(default)
    }

    /// Resolves the current value of `pointer`, substituting the supplied
    /// fallback when absent.
    pub fn get_or_else<V>(&self, pointer: &Pointer<V>, fallback: impl FnOnce() -> V) -> V
    where
        V: Clone + Send + Sync + 'static,
    {
        self.get(pointer).unwrap_or_else(fallback)
    }

    /// Whether a binding exists for `pointer`. True even if the bound
    /// resolver currently yields `None`.
    pub fn contains<V: 'static>(&self, pointer: &Pointer<V>) -> bool {
        self.entries.contains_key(&pointer.erased())
    }

    /// The number of bindings in this collection.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this collection has no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The type-erased identities of all bound pointers.
    pub fn keys(&self) -> Vec<PointerKey> {
        self.entries.keys().cloned().collect()
    }
}

impl fmt::Debug for Pointers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.entries.keys().map(PointerKey::key).collect();
        keys.sort_unstable();
        f.debug_struct("Pointers").field("keys", &keys).finish()
    }
}

pub(crate) fn downcast<V: Clone + 'static>(value: BoxedValue) -> Option<V> {
    value.downcast::<V>().ok().map(|boxed| *boxed)
}

/// Something that can resolve values through a [`Pointers`] collection.
pub trait Pointered {
    /// The pointer collection of this object.
    fn pointers(&self) -> Pointers;

    /// Resolves `pointer` against this object's pointers.
    fn get<V>(&self, pointer: &Pointer<V>) -> Option<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        self.pointers().get(pointer)
    }

    /// Resolves `pointer`, substituting `default` when absent.
    fn get_or_default<V>(&self, pointer: &Pointer<V>, default: V) -> V
    where
        V: Clone + Send + Sync + 'static,
    {
        self.pointers().get_or_default(pointer, default)
    }
}

/// Builder for [`Pointers`].
#[derive(Default)]
pub struct PointersBuilder {
    entries: HashMap<PointerKey, Resolver>,
}

impl PointersBuilder {
    /// Binds `pointer` to a fixed value.
    pub fn with_static<V>(self, pointer: &Pointer<V>, value: V) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        self.with_dynamic(pointer, move || Some(value.clone()))
    }

    /// Binds `pointer` to a resolver invoked on every lookup.
    pub fn with_dynamic<V, F>(mut self, pointer: &Pointer<V>, resolve: F) -> Self
    where
        V: Clone + Send + Sync + 'static,
        F: Fn() -> Option<V> + Send + Sync + 'static,
    {
        let resolver: Resolver = Arc::new(move || {
            resolve().map(|value| Box::new(value) as BoxedValue)
        });
        self.entries.insert(pointer.erased(), resolver);
        self
    }

    /// Binds `pointer` to the value of `target_pointer` on another
    /// pointered object.
    ///
    /// The delegate is re-resolved on every lookup, so the forward always
    /// reflects the target's current value rather than a value captured
    /// when the forward was declared.
    pub fn with_forward<V, T>(
        self,
        pointer: &Pointer<V>,
        target: T,
        target_pointer: Pointer<V>,
    ) -> Self
    where
        V: Clone + Send + Sync + 'static,
        T: Pointered + Send + Sync + 'static,
    {
        self.with_dynamic(pointer, move || target.get(&target_pointer))
    }

    /// Like [`with_forward`](Self::with_forward), but substitutes an own
    /// default when the delegate pointer is absent.
    pub fn with_forward_default<V, T>(
        self,
        pointer: &Pointer<V>,
        target: T,
        target_pointer: Pointer<V>,
        default: V,
    ) -> Self
    where
        V: Clone + Send + Sync + 'static,
        T: Pointered + Send + Sync + 'static,
    {
        self.with_dynamic(pointer, move || {
            Some(target.get_or_default(&target_pointer, default.clone()))
        })
    }

    /// Snapshots the accumulated bindings into an immutable [`Pointers`].
    pub fn build(self) -> Pointers {
        Pointers {
            entries: Arc::new(self.entries),
        }
    }
}
