//! §5 order step "health": death resolution -- mob death rolls loot for
//! every squad that meets the §3 looting-squad threshold (Testable
//! Property 3, Scenario S6), flower death marks the flower dead instead of
//! deleting it outright (so the client can show a death screen and rejoin
//! into a fresh flower later).

use crate::ecs::components::{Drop, Relations};
use crate::ecs::entity::Entity;
use crate::ecs::store::World;

pub fn tick(world: &mut World) {
    kill_dead_mobs(world);
    kill_dead_flowers(world);
}

fn kill_dead_mobs(world: &mut World) {
    let dead: Vec<Entity> = world
        .for_each_health()
        .filter(|(e, h)| h.is_dead() && world.has_mob(*e))
        .map(|(e, _)| e)
        .collect();

    for e in dead {
        let Some(mob) = world.get_mob(e).copied() else { continue };
        let Some(health) = world.get_health(e).copied() else { continue };
        let Some(physical) = world.get_physical(e).copied() else { continue };

        if !mob.no_drop {
            let is_boss = matches!(mob.id, rysteria_protocol::ids::MobId::TRex);
            let looters = health.looting_squads(None, is_boss);
            let mut mask: u8 = 0;
            for slot in looters {
                if slot < 8 {
                    mask |= 1 << slot;
                }
            }
            spawn_drop(world, physical.arena, physical.x, physical.y, mob.rarity, mask);
        }
        world.request_deletion(e);
    }
}

fn kill_dead_flowers(world: &mut World) {
    let dead: Vec<Entity> = world
        .for_each_health()
        .filter(|(e, h)| h.is_dead() && world.has_flower(*e))
        .map(|(e, _)| e)
        .collect();
    for e in dead {
        if let Some(flower) = world.get_flower_mut(e) {
            flower.dead = true;
            flower.face_flags |= crate::ecs::components::FaceFlags::DEAD;
        }
    }
}

fn spawn_drop(world: &mut World, arena: Entity, x: f32, y: f32, mob_rarity: rysteria_protocol::ids::Rarity, mask: u8) {
    let Ok(drop_entity) = world.alloc_entity() else { return };
    let _ = world.add_drop(drop_entity, Drop::new(rysteria_protocol::ids::PetalId::Basic, mob_rarity, mask));
    let _ = world.add_physical(
        drop_entity,
        crate::ecs::components::Physical { x, y, radius: 8.0, arena, ..Default::default() },
    );
    let _ = world.add_relations(drop_entity, Relations::default());
}
