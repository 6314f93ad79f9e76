//! The `World`: entity allocation plus dense storage for every recognized
//! component kind (§3, §4.1).
//!
//! Deletion is two-phase, per §4.1's "mark -> sweep": `request_deletion`
//! only sets a bit; `entity_alive` consults that bit immediately so the
//! same-tick semantics in Testable Property 1 hold, but components are not
//! actually freed until `sweep_deletions` runs once, after every system has
//! had a chance to run, at the end of the tick.

use std::collections::HashSet;

use super::components::*;
use super::entity::{Entity, EntityAllocError, EntityAllocator};
use super::sparse_set::SparseSet;

/// A snapshot of what died this sweep, handed to the spawn/health systems
/// so they can run free hooks (§4.1: "Mob-free publishes loot drops")
/// without the sweep itself needing write access to spawn new entities.
pub struct DeletionRecord {
    pub entity: Entity,
    pub had_mob: Option<Mob>,
    pub had_health: Option<Health>,
    pub had_relations: Option<Relations>,
    pub had_physical: Option<Physical>,
    pub had_petal: Option<Petal>,
    pub had_player_info: Option<PlayerInfo>,
}

#[derive(Default)]
pub struct World {
    allocator: EntityAllocator,
    pending_deletion: HashSet<Entity>,

    physical: SparseSet<Physical>,
    health: SparseSet<Health>,
    relations: SparseSet<Relations>,
    mob: SparseSet<Mob>,
    petal: SparseSet<Petal>,
    flower: SparseSet<Flower>,
    drop: SparseSet<Drop>,
    player_info: SparseSet<PlayerInfo>,
    ai: SparseSet<Ai>,
    arena: SparseSet<Arena>,
    nest: SparseSet<Nest>,
    web: SparseSet<Web>,
    centipede: SparseSet<Centipede>,
    squad: SparseSet<Squad>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_entity(&mut self) -> Result<Entity, EntityAllocError> {
        self.allocator.allocate()
    }

    /// §4.1: false once `request_deletion` has been called, even though the
    /// components are not freed until the next sweep.
    pub fn entity_alive(&self, e: Entity) -> bool {
        self.allocator.is_alive(e) && !self.pending_deletion.contains(&e)
    }

    /// True only once the allocator itself has recycled the slot (used by
    /// component accessors, which must still succeed mid-tick per §4.1).
    pub fn entity_allocated(&self, e: Entity) -> bool {
        self.allocator.is_alive(e)
    }

    pub fn request_deletion(&mut self, e: Entity) {
        if self.allocator.is_alive(e) {
            self.pending_deletion.insert(e);
        }
    }

    pub fn is_pending_deletion(&self, e: Entity) -> bool {
        self.pending_deletion.contains(&e)
    }

    /// Frees every entity marked this tick, in one atomic sweep, returning
    /// a record of what each carried so free hooks can run afterward.
    pub fn sweep_deletions(&mut self) -> Vec<DeletionRecord> {
        let dying: Vec<Entity> = self.pending_deletion.drain().collect();
        let mut records = Vec::with_capacity(dying.len());
        for e in dying {
            let record = DeletionRecord {
                entity: e,
                had_mob: self.mob.remove(e),
                had_health: self.health.remove(e),
                had_relations: self.relations.remove(e),
                had_physical: self.physical.remove(e),
                had_petal: self.petal.remove(e),
                had_player_info: self.player_info.remove(e),
            };
            self.flower.remove(e);
            self.drop.remove(e);
            self.ai.remove(e);
            self.arena.remove(e);
            self.nest.remove(e);
            self.web.remove(e);
            self.centipede.remove(e);
            self.squad.remove(e);
            self.allocator.free(e);
            records.push(record);
        }
        records
    }
}

macro_rules! component_accessors {
    ($field:ident, $ty:ty, $add:ident, $get:ident, $get_mut:ident, $has:ident, $for_each:ident, $for_each_mut:ident, $remove:ident) => {
        impl World {
            pub fn $add(&mut self, e: Entity, value: $ty) -> Result<&mut $ty, ()> {
                self.$field.insert(e, value)
            }

            pub fn $get(&self, e: Entity) -> Option<&$ty> {
                self.$field.get(e)
            }

            pub fn $get_mut(&mut self, e: Entity) -> Option<&mut $ty> {
                self.$field.get_mut(e)
            }

            pub fn $has(&self, e: Entity) -> bool {
                self.$field.has(e)
            }

            pub fn $for_each(&self) -> impl Iterator<Item = (Entity, &$ty)> {
                self.$field.iter()
            }

            pub fn $for_each_mut(&mut self) -> impl Iterator<Item = (Entity, &mut $ty)> {
                self.$field.iter_mut()
            }

            pub fn $remove(&mut self, e: Entity) -> Option<$ty> {
                self.$field.remove(e)
            }
        }
    };
}

component_accessors!(physical, Physical, add_physical, get_physical, get_physical_mut, has_physical, for_each_physical, for_each_physical_mut, remove_physical);
component_accessors!(health, Health, add_health, get_health, get_health_mut, has_health, for_each_health, for_each_health_mut, remove_health);
component_accessors!(relations, Relations, add_relations, get_relations, get_relations_mut, has_relations, for_each_relations, for_each_relations_mut, remove_relations);
component_accessors!(mob, Mob, add_mob, get_mob, get_mob_mut, has_mob, for_each_mob, for_each_mob_mut, remove_mob);
component_accessors!(petal, Petal, add_petal, get_petal, get_petal_mut, has_petal, for_each_petal, for_each_petal_mut, remove_petal);
component_accessors!(flower, Flower, add_flower, get_flower, get_flower_mut, has_flower, for_each_flower, for_each_flower_mut, remove_flower);
component_accessors!(drop, Drop, add_drop, get_drop, get_drop_mut, has_drop, for_each_drop, for_each_drop_mut, remove_drop);
component_accessors!(player_info, PlayerInfo, add_player_info, get_player_info, get_player_info_mut, has_player_info, for_each_player_info, for_each_player_info_mut, remove_player_info);
component_accessors!(ai, Ai, add_ai, get_ai, get_ai_mut, has_ai, for_each_ai, for_each_ai_mut, remove_ai);
component_accessors!(arena, Arena, add_arena, get_arena, get_arena_mut, has_arena, for_each_arena, for_each_arena_mut, remove_arena);
component_accessors!(nest, Nest, add_nest, get_nest, get_nest_mut, has_nest, for_each_nest, for_each_nest_mut, remove_nest);
component_accessors!(web, Web, add_web, get_web, get_web_mut, has_web, for_each_web, for_each_web_mut, remove_web);
component_accessors!(centipede, Centipede, add_centipede, get_centipede, get_centipede_mut, has_centipede, for_each_centipede, for_each_centipede_mut, remove_centipede);
component_accessors!(squad, Squad, add_squad, get_squad, get_squad_mut, has_squad, for_each_squad, for_each_squad_mut, remove_squad);

#[cfg(test)]
mod tests {
    use super::*;
    use rysteria_protocol::ids::Team;

    #[test]
    fn deletion_is_deferred_to_next_sweep() {
        let mut world = World::new();
        let e = world.alloc_entity().unwrap();
        world.add_physical(e, Physical::default()).unwrap();
        world.request_deletion(e);

        // Same tick: entity_alive is false already (Testable Property 1)...
        assert!(!world.entity_alive(e));
        // ...but the component is still there until the sweep runs.
        assert!(world.has_physical(e));

        world.sweep_deletions();
        assert!(!world.has_physical(e));
        assert!(!world.entity_allocated(e));
    }

    #[test]
    fn duplicate_component_attach_fails() {
        let mut world = World::new();
        let e = world.alloc_entity().unwrap();
        world.add_relations(e, Relations { team: Team::Players, ..Default::default() }).unwrap();
        assert!(world.add_relations(e, Relations::default()).is_err());
    }

    #[test]
    fn sweep_reports_mob_for_loot_hook() {
        let mut world = World::new();
        let e = world.alloc_entity().unwrap();
        world.add_mob(e, Mob::new(rysteria_protocol::ids::MobId::Bee, rysteria_protocol::ids::Rarity::Common)).unwrap();
        world.request_deletion(e);
        let records = world.sweep_deletions();
        assert_eq!(records.len(), 1);
        assert!(records[0].had_mob.is_some());
    }
}
