//! Shared blackboard of intermediate generation artifacts.
//!
//! Modules exchange data through a single [`Storage`] owned by the
//! generator. There is no locking: the generator runs one module at a time
//! and hands the store out as `&mut Storage`, so no two modules can touch it
//! concurrently.

mod array2d;

pub use array2d::Array2D;

use std::any::Any;
use std::collections::HashMap;

/// Key of the height map written by the basis module.
pub const HEIGHT_MAP: &str = "height_map";

/// Typed key/value store. Each key holds at most one payload of any type.
#[derive(Default)]
pub struct Storage {
    entries: HashMap<String, Box<dyn Any>>,
}

impl Storage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any payload is stored under `key`.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the payload under `key` if it has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns the payload under `key` mutably if it has type `T`.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.entries
            .get_mut(key)
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Stores `value` under `key`, dropping any previous payload.
    pub fn put<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    /// Removes the payload under `key`. Returns true if one was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Moves the payload under `key` out of the store if it has type `T`.
    /// A payload of another type stays in place.
    pub fn take<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.entries.get(key).is_some_and(|value| value.is::<T>()) {
            return None;
        }
        self.entries
            .remove(key)
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Iterates over stored keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every payload.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Storage").field("keys", &keys).finish()
    }
}
