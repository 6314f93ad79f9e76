//! Per-component dense storage.
//!
//! §4.1: "each component type owns a dense `vector<Entity>` plus a sparse
//! index map." This is that vector plus map, generic over the component's
//! Rust type. Deletion is deferred: `remove` only happens during the
//! end-of-tick sweep (`World::sweep_deletions`), never mid-tick.

use super::entity::{Entity, MAX_ENTITIES};

pub struct SparseSet<T> {
    dense: Vec<T>,
    dense_entities: Vec<Entity>,
    sparse: Vec<Option<u32>>,
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            dense_entities: Vec::new(),
            sparse: vec![None; MAX_ENTITIES],
        }
    }

    fn slot(&self, e: Entity) -> Option<usize> {
        self.sparse.get(e.index() as usize).copied().flatten().map(|i| i as usize)
    }

    pub fn has(&self, e: Entity) -> bool {
        self.slot(e).is_some()
    }

    pub fn get(&self, e: Entity) -> Option<&T> {
        self.slot(e).map(|i| &self.dense[i])
    }

    pub fn get_mut(&mut self, e: Entity) -> Option<&mut T> {
        self.slot(e).map(move |i| &mut self.dense[i])
    }

    /// Attaches `value` to `e`. Returns `Err(())` if `e` already has this
    /// component (§4.1: "fails if duplicate").
    pub fn insert(&mut self, e: Entity, value: T) -> Result<&mut T, ()> {
        if self.has(e) {
            return Err(());
        }
        let idx = self.dense.len() as u32;
        if (e.index() as usize) >= self.sparse.len() {
            self.sparse.resize(e.index() as usize + 1, None);
        }
        self.sparse[e.index() as usize] = Some(idx);
        self.dense.push(value);
        self.dense_entities.push(e);
        Ok(self.dense.last_mut().expect("just pushed"))
    }

    /// Swap-removes the component for `e`, fixing up the sparse index of
    /// whatever got moved into its slot.
    pub fn remove(&mut self, e: Entity) -> Option<T> {
        let idx = self.slot(e)?;
        self.sparse[e.index() as usize] = None;
        let last = self.dense.len() - 1;
        let removed = self.dense.swap_remove(idx);
        self.dense_entities.swap_remove(idx);
        if idx != last {
            let moved = self.dense_entities[idx];
            self.sparse[moved.index() as usize] = Some(idx as u32);
        }
        Some(removed)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.dense_entities.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.dense_entities.iter().copied().zip(self.dense.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}
