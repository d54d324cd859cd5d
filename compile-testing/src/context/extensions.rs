//! Type-keyed store for per-session feature state.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Holds at most one value per type, created on first request.
///
/// Entries are never removed. A session mutates the registry while it is
/// being configured; once the run starts the registry is owned by the shared
/// build model and only read.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `T`, if one was ever created.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| (**entry).downcast_ref::<T>())
    }

    /// Returns the value for `T` mutably, if one was ever created.
    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.entries
            .get_mut(&TypeId::of::<T>())
            .and_then(|entry| (**entry).downcast_mut::<T>())
    }

    /// Returns the value for `T`, creating it with `factory` on first use.
    ///
    /// The factory is invoked at most once per type; later calls return the
    /// cached instance and drop their factory unused.
    pub fn get_or_create<T, F>(&mut self, factory: F) -> &mut T
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let entry = self
            .entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(factory()));
        match (**entry).downcast_mut::<T>() {
            Some(value) => value,
            None => unreachable!("extension entries are keyed by their own TypeId"),
        }
    }

    /// Returns true if a value for `T` exists.
    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("len", &self.entries.len())
            .finish()
    }
}
