//! §5 order step "spawn": runs the §4.3 maze spawner for every arena.

use crate::ecs::entity::Entity;
use crate::ecs::store::World;
use crate::maze::spawner;

pub fn tick(world: &mut World) {
    let arenas: Vec<Entity> = world.for_each_arena().map(|(e, _)| e).collect();
    for arena in arenas {
        spawner::tick(world, arena);
    }
}
