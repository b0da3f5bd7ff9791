//! Primary-key keyed cache of shared entity handles.
//!
//! # Invariants
//! - At most one handle per key; `insert` replaces.
//! - Entries leave only through `remove`; there is no eviction.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared, mutable handle to a cached entity.
pub type Shared<T> = Rc<RefCell<T>>;

#[derive(Debug)]
pub struct IdentityMap<T> {
    entries: HashMap<i64, Shared<T>>,
}

impl<T> Default for IdentityMap<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> IdentityMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new reference to the cached handle, if any.
    pub fn get(&self, id: i64) -> Option<Shared<T>> {
        self.entries.get(&id).map(Rc::clone)
    }

    pub fn insert(&mut self, id: i64, handle: Shared<T>) {
        self.entries.insert(id, handle);
    }

    pub fn remove(&mut self, id: i64) -> Option<Shared<T>> {
        self.entries.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
