//! §5 order step "centipede": each segment trails its parent node at a
//! fixed follow distance, like the orbiting-chain rigs used for petal
//! trains elsewhere in the ECS.

use crate::ecs::entity::Entity;
use crate::ecs::store::World;

const FOLLOW_DISTANCE: f32 = 24.0;
const FOLLOW_FACTOR: f32 = 0.3;

pub fn tick(world: &mut World) {
    let segments: Vec<(Entity, Option<Entity>)> = world
        .for_each_centipede()
        .map(|(e, c)| (e, c.parent_node))
        .collect();

    for (segment, parent) in segments {
        let Some(parent) = parent else { continue };
        let (Some(pp), Some(sp)) = (world.get_physical(parent).copied(), world.get_physical(segment).copied())
        else {
            continue;
        };
        let dx = pp.x - sp.x;
        let dy = pp.y - sp.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= FOLLOW_DISTANCE {
            continue;
        }
        let pull = dist - FOLLOW_DISTANCE;
        if let Some(p) = world.get_physical_mut(segment) {
            p.x += dx / dist * pull * FOLLOW_FACTOR;
            p.y += dy / dist * pull * FOLLOW_FACTOR;
        }
    }
}
