//! Generation-tagged entity handles.
//!
//! Grounded in `examples/bruno1308-nomai-engine/crates/nomai-ecs/src/entity.rs`'s
//! `EntityId`/`EntityAllocator` pair: a packed generational index with a
//! FIFO free-list so generations spread out over time instead of piling up
//! on one hot slot. Adapted to `spec.md` §3's fixed-capacity design target
//! (`MAX_ENTITIES = 16_384`) and its reserved null handle.

use std::collections::VecDeque;
use std::fmt;

/// Design-target entity table capacity (§3).
pub const MAX_ENTITIES: usize = 16_384;

/// An opaque `(index, generation)` handle. Index 0 / generation 0 is the
/// reserved null entity (§3).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub const NULL: Entity = Entity { index: 0, generation: 0 };

    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

/// Allocates and recycles [`Entity`] handles with generational tracking.
///
/// Index 0 is permanently reserved for [`Entity::NULL`] and never handed
/// out by `allocate`.
#[derive(Debug)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_indices: VecDeque<u32>,
    capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EntityAllocError {
    #[error("entity table is full (capacity {0})")]
    TableFull(usize),
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new(MAX_ENTITIES)
    }
}

impl EntityAllocator {
    pub fn new(capacity: usize) -> Self {
        // slot 0 is reserved for the null entity from the start.
        Self {
            generations: vec![0],
            alive: vec![true],
            free_indices: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len_allocated(&self) -> usize {
        self.generations.len()
    }

    pub fn allocate(&mut self) -> Result<Entity, EntityAllocError> {
        if let Some(index) = self.free_indices.pop_front() {
            self.alive[index as usize] = true;
            return Ok(Entity::new(index, self.generations[index as usize]));
        }
        if self.generations.len() >= self.capacity {
            return Err(EntityAllocError::TableFull(self.capacity));
        }
        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.alive.push(true);
        Ok(Entity::new(index, 0))
    }

    /// Validates `e` against the stored generation, per §3's invariant that
    /// every reference is checked before dereference.
    pub fn is_alive(&self, e: Entity) -> bool {
        if e.is_null() {
            return false;
        }
        let idx = e.index as usize;
        idx < self.alive.len() && self.alive[idx] && self.generations[idx] == e.generation
    }

    /// Recycles the slot, bumping its generation so stale handles are
    /// rejected by `is_alive` from this point on.
    pub fn free(&mut self, e: Entity) {
        if e.is_null() {
            return;
        }
        let idx = e.index as usize;
        if idx >= self.alive.len() || !self.alive[idx] {
            return;
        }
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_indices.push_back(e.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handle_is_rejected_after_free() {
        let mut alloc = EntityAllocator::new(16);
        let e = alloc.allocate().unwrap();
        assert!(alloc.is_alive(e));
        alloc.free(e);
        assert!(!alloc.is_alive(e));
    }

    #[test]
    fn recycled_index_gets_new_generation() {
        let mut alloc = EntityAllocator::new(16);
        let e1 = alloc.allocate().unwrap();
        alloc.free(e1);
        let e2 = alloc.allocate().unwrap();
        assert_eq!(e1.index(), e2.index());
        assert_ne!(e1.generation(), e2.generation());
        assert!(!alloc.is_alive(e1));
        assert!(alloc.is_alive(e2));
    }

    #[test]
    fn table_full_refuses_new_entity() {
        let mut alloc = EntityAllocator::new(2);
        alloc.allocate().unwrap(); // index 1
        assert!(matches!(alloc.allocate(), Err(EntityAllocError::TableFull(2))));
    }

    #[test]
    fn null_entity_is_never_alive() {
        let alloc = EntityAllocator::new(16);
        assert!(!alloc.is_alive(Entity::NULL));
    }
}
