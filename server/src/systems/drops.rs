//! §5 order step "drops": despawn timer, and pickup by an in-range,
//! eligible flower (§3 Drop: `pickable_by_squad` gates who may collect it).

use crate::ecs::components::Drop;
use crate::ecs::entity::Entity;
use crate::ecs::store::World;

const PICKUP_RADIUS: f32 = 24.0;

pub fn tick(world: &mut World) {
    let expired: Vec<Entity> = world
        .for_each_drop_mut()
        .filter_map(|(e, drop)| {
            drop.ticks_until_despawn = drop.ticks_until_despawn.saturating_sub(1);
            (drop.ticks_until_despawn == 0).then_some(e)
        })
        .collect();
    for e in expired {
        world.request_deletion(e);
    }

    let drop_entities: Vec<(Entity, f32, f32, Drop)> = world
        .for_each_drop()
        .filter_map(|(e, drop)| {
            let p = world.get_physical(e)?;
            Some((e, p.x, p.y, *drop))
        })
        .collect();
    if drop_entities.is_empty() {
        return;
    }

    let flowers: Vec<(Entity, f32, f32, f32, usize)> = world
        .for_each_player_info()
        .filter_map(|(e, info)| {
            let p = world.get_physical(info.flower)?;
            Some((info.flower, p.x, p.y, PICKUP_RADIUS + info.modifiers.pickup_radius, info.squad_pos as usize))
        })
        .collect();

    for (drop_entity, dx, dy, drop) in drop_entities {
        for &(flower, fx, fy, radius, squad_slot) in &flowers {
            if !drop.is_pickable_by(squad_slot) {
                continue;
            }
            let dist2 = (dx - fx).powi(2) + (dy - fy).powi(2);
            if dist2 <= radius * radius {
                world.request_deletion(drop_entity);
                // TODO: credit drop.id/drop.rarity to `flower`'s inventory once account state lands.
                let _ = flower;
                break;
            }
        }
    }
}
