use serde::{Deserialize, Serialize};

/// Configuration value that only changes by whole-object replacement.
///
/// There is no `&mut T` accessor: every change goes through [`Versioned::replace`]
/// or [`Versioned::update`], which swap in a new value and bump the version. Readers
/// holding an old version number can detect that their snapshot is stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    version: u64,
    value: T,
}

impl<T> Versioned<T> {
    pub fn new(value: T) -> Self {
        Self { version: 0, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Swap in a new value; returns the new version.
    pub fn replace(&mut self, value: T) -> u64 {
        self.value = value;
        self.version += 1;
        self.version
    }

    /// Derive the next value from the current one.
    pub fn update<F>(&mut self, f: F) -> u64
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.replace(next)
    }

    pub fn is_stale(&self, seen_version: u64) -> bool {
        seen_version != self.version
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Default> Default for Versioned<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
