//! Pointer System
//!
//! Typed, keyed value resolution used across the domain:
//! - [`Pointer`]: a typed lookup key, identified by value type and string key
//! - [`Pointers`]: an immutable collection of pointer bindings
//! - [`Setting`]: a pointer with a default value
//! - [`Settings`]: a shared, mutable collection of setting values
//!
//! Entities expose their readable state through [`Pointered`] and their
//! configurable state through [`Configured`].

pub mod pointer;
pub mod pointers;
pub mod setting;
pub mod settings;

pub use pointer::{Pointer, PointerKey};
pub use pointers::{BoxedValue, Pointered, Pointers, PointersBuilder};
pub use setting::Setting;
pub use settings::{Configured, Settings, SettingsBuilder, UnknownResolver};
