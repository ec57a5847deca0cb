use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a store mutex, recovering the data if a panicking request poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Id-keyed rows plus the counter that assigns ids. Lives behind one mutex so
/// assignment and insertion happen in the same critical section.
#[derive(Debug)]
pub(crate) struct EntityTable<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T: Clone> EntityTable<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    pub fn insert_with(&mut self, build: impl FnOnce(u64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;

        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    pub fn get(&self, id: u64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn values(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    /// Overwrites an existing row. Returns false if the id is unknown.
    pub fn replace(&mut self, id: u64, row: T) -> bool {
        match self.rows.get_mut(&id) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
