//! Mutable setting containers.
//!
//! A [`Settings`] holds the configured values of an entity. Lookups are
//! total: a setting that was never set resolves to its default, so callers
//! never branch on "configured vs. unconfigured".
//!
//! Resolution order per lookup:
//! 1. a typed binding for the setting's pointer identity,
//! 2. an unknown-key resolver registered for the setting's string key,
//! 3. the setting's own default.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::pointer::PointerKey;
use super::pointers::{downcast, BoxedValue, Resolver};
use super::setting::Setting;

/// A resolver consulted for keys without a typed binding. It receives the
/// requested value type and may yield a value of exactly that type.
pub type UnknownResolver = Arc<dyn Fn(TypeId) -> Option<BoxedValue> + Send + Sync>;

struct SettingsInner {
    bindings: RwLock<HashMap<PointerKey, Resolver>>,
    unknowns: HashMap<String, UnknownResolver>,
}

/// A shared, mutable collection of setting values.
///
/// The handle is cheap to clone and all clones observe the same state, so a
/// `Settings` can be read from one place while another mutates it. Unknown-key
/// resolvers are fixed at build time; typed bindings change over the
/// container's lifetime via [`set`](Settings::set).
#[derive(Clone)]
pub struct Settings {
    inner: Arc<SettingsInner>,
}

impl Settings {
    /// Creates a settings container with no bindings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts a new builder.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Copies all current typed bindings and unknown-key resolvers into a
    /// new builder. Used to layer one settings container over another, as
    /// channel templates do.
    pub fn to_builder(&self) -> SettingsBuilder {
        SettingsBuilder {
            bindings: self.inner.bindings.read().clone(),
            unknowns: self.inner.unknowns.clone(),
        }
    }

    /// Resolves the current value of `setting`, falling back to its default.
    pub fn get<V>(&self, setting: &Setting<V>) -> V
    where
        V: Clone + Send + Sync + 'static,
    {
        self.get_or_else(setting, || setting.default_value())
    }

    /// Resolves the current value of `setting`, falling back to the
    /// supplied default.
    pub fn get_or_else<V>(&self, setting: &Setting<V>, fallback: impl FnOnce() -> V) -> V
    where
        V: Clone + Send + Sync + 'static,
    {
        self.find(setting).unwrap_or_else(fallback)
    }

    /// Resolves the current value of `setting` without applying any
    /// default. `None` means neither a typed binding nor an unknown-key
    /// resolver produced a value.
    pub fn find<V>(&self, setting: &Setting<V>) -> Option<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        // Clone the resolver out so it runs without the lock held. Bound
        // resolvers may read back into this container.
        let bound = self.inner.bindings.read().get(&setting.erased()).cloned();
        if let Some(resolver) = bound {
            return resolver().and_then(downcast::<V>);
        }
        let unknown = self.inner.unknowns.get(setting.key())?;
        unknown(TypeId::of::<V>()).and_then(downcast::<V>)
    }

    /// Sets `setting` to a fixed value, replacing any previous typed
    /// binding. Returns the previously bound value, or `None` when the
    /// setting had not been set before.
    pub fn set<V>(&self, setting: &Setting<V>, value: V) -> Option<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        let resolver: Resolver = Arc::new(move || Some(Box::new(value.clone()) as BoxedValue));
        let previous = self
            .inner
            .bindings
            .write()
            .insert(setting.erased(), resolver);
        previous.and_then(|resolver| resolver()).and_then(downcast::<V>)
    }

    /// Whether `setting` has a typed binding or an unknown-key resolver
    /// registered under its key.
    pub fn contains<V>(&self, setting: &Setting<V>) -> bool
    where
        V: Clone + Send + Sync + 'static,
    {
        self.inner.bindings.read().contains_key(&setting.erased())
            || self.inner.unknowns.contains_key(setting.key())
    }

    /// The string keys of all typed bindings, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .bindings
            .read()
            .keys()
            .map(|key| key.key().to_string())
            .collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.keys();
        keys.sort_unstable();
        f.debug_struct("Settings").field("keys", &keys).finish()
    }
}

/// Something that is configured through a [`Settings`] container.
pub trait Configured {
    /// The settings of this object.
    fn settings(&self) -> Settings;

    /// Resolves `setting`, falling back to its default.
    fn get<V>(&self, setting: &Setting<V>) -> V
    where
        V: Clone + Send + Sync + 'static,
    {
        self.settings().get(setting)
    }

    /// Resolves a boolean `setting`. Convenience for flag checks.
    fn is(&self, setting: &Setting<bool>) -> bool {
        self.settings().get(setting)
    }

    /// Sets `setting`, returning the previously bound value.
    fn set<V>(&self, setting: &Setting<V>, value: V) -> Option<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        self.settings().set(setting, value)
    }
}

/// Builder for [`Settings`].
#[derive(Default)]
pub struct SettingsBuilder {
    bindings: HashMap<PointerKey, Resolver>,
    unknowns: HashMap<String, UnknownResolver>,
}

impl SettingsBuilder {
    /// Binds `setting` to a fixed value.
    pub fn with_static<V>(self, setting: &Setting<V>, value: V) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        self.with_dynamic(setting, move || Some(value.clone()))
    }

    /// Binds `setting` to a resolver invoked on every lookup. A resolver
    /// yielding `None` falls through to the setting's default, not to the
    /// unknown-key resolvers.
    pub fn with_dynamic<V, F>(mut self, setting: &Setting<V>, resolve: F) -> Self
    where
        V: Clone + Send + Sync + 'static,
        F: Fn() -> Option<V> + Send + Sync + 'static,
    {
        let resolver: Resolver =
            Arc::new(move || resolve().map(|value| Box::new(value) as BoxedValue));
        self.bindings.insert(setting.erased(), resolver);
        self
    }

    /// Registers a resolver for a key that has no typed binding, e.g. a
    /// key read from an external config file before the typed setting
    /// constant exists. The resolver is handed the requested value type
    /// and must return a value of exactly that type, or `None`.
    pub fn with_unknown(
        mut self,
        key: impl Into<String>,
        resolve: impl Fn(TypeId) -> Option<BoxedValue> + Send + Sync + 'static,
    ) -> Self {
        self.unknowns.insert(key.into(), Arc::new(resolve));
        self
    }

    /// Builds the settings container.
    pub fn build(self) -> Settings {
        Settings {
            inner: Arc::new(SettingsInner {
                bindings: RwLock::new(self.bindings),
                unknowns: self.unknowns,
            }),
        }
    }
}
