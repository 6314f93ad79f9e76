//! Per-tick maze difficulty bookkeeping and mob spawn pacing (§4.3).

use crate::balance;
use crate::ecs::components::{Mob, PhysicalFlags, Relations};
use crate::ecs::entity::Entity;
use crate::ecs::store::World;
use rysteria_protocol::ids::Team;

const FLOWER_FOV: f32 = 3072.0;
const MOB_DESPAWN_CAP: u32 = 30 * 25;

struct FlowerSighting {
    x: f32,
    y: f32,
    level: u32,
}

/// Runs one tick of §4.3 steps 1-5 against `arena_entity`'s `Arena` cells.
///
/// `arena_entity` must carry an `Arena` component; entities not carrying
/// one are silently skipped (a caller bug, not a runtime condition worth a
/// panic over).
pub fn tick(world: &mut World, arena_entity: Entity) {
    let Some((grid_dim, grid_size, biome)) = world
        .get_arena(arena_entity)
        .map(|a| (a.grid_dim, a.grid_size, a.biome))
    else {
        return;
    };

    let sightings: Vec<FlowerSighting> = world
        .for_each_flower()
        .filter_map(|(e, flower)| {
            if flower.dead {
                return None;
            }
            let physical = world.get_physical(e)?;
            if physical
                .flags
                .intersects(PhysicalFlags::BUBBLING | PhysicalFlags::BUBBLING_TO_DEATH)
            {
                return None;
            }
            Some(FlowerSighting { x: physical.x, y: physical.y, level: flower.level })
        })
        .collect();

    // Step 3: mobs that should have their despawn timer ticked, by entity.
    let mob_despawns: Vec<Entity> = world
        .for_each_mob()
        .filter(|(_, mob)| !mob.player_spawned)
        .filter_map(|(e, _)| {
            let physical = world.get_physical(e)?;
            let arena = world.get_arena(arena_entity)?;
            let (cx, cy) = arena.world_to_cell(physical.x, physical.y);
            let idx = arena.cell_index(cx, cy)?;
            if arena.cells[idx].player_count == 0 {
                Some(e)
            } else {
                None
            }
        })
        .collect();

    {
        let Some(arena) = world.get_arena_mut(arena_entity) else { return };

        // Step 1: reset.
        for cell in &mut arena.cells {
            cell.player_count = 0;
            cell.local_difficulty = 0.0;
        }

        // Step 2: mark FOV.
        for sighting in &sightings {
            let half = (FLOWER_FOV / arena.grid_size).ceil() as i32;
            let (fcx, fcy) = arena.world_to_cell(sighting.x, sighting.y);
            for cy in (fcy - half)..=(fcy + half) {
                for cx in (fcx - half)..=(fcx + half) {
                    if let Some(idx) = arena.cell_index(cx, cy) {
                        arena.cells[idx].bump_player_count();
                        arena.cells[idx].apply_flower_difficulty(sighting.level);
                    }
                }
            }
        }
    }

    for e in mob_despawns {
        let expired = {
            let Some(mob) = world.get_mob_mut(e) else { continue };
            mob.ticks_until_despawn = (mob.ticks_until_despawn + 1).min(MOB_DESPAWN_CAP);
            mob.ticks_until_despawn >= MOB_DESPAWN_CAP
        };
        if expired {
            if let Some(mob) = world.get_mob_mut(e) {
                mob.no_drop = true;
            }
            world.request_deletion(e);
        }
    }

    spawn_pass(world, arena_entity, biome, grid_dim);

    if let Some(arena) = world.get_arena_mut(arena_entity) {
        for cell in &mut arena.cells {
            cell.decay_overload(0.01);
        }
    }
}

/// §4.3 step 4: macro-cell (2x2) spawn budgeting and per-cell pacing.
fn spawn_pass(world: &mut World, arena_entity: Entity, biome: u8, grid_dim: u32) {
    let macro_dim = (grid_dim / 2).max(1);
    for macro_y in 0..macro_dim {
        for macro_x in 0..macro_dim {
            let sub_cells: Vec<(i32, i32)> = (0..2)
                .flat_map(|dy| (0..2).map(move |dx| (dx, dy)))
                .map(|(dx, dy)| ((macro_x * 2 + dx) as i32, (macro_y * 2 + dy) as i32))
                .collect();

            let (player_count, overload, total_points) = {
                let Some(arena) = world.get_arena(arena_entity) else { return };
                let mut player_count = 0u32;
                let mut overload = 0.0f32;
                let mut total_points = 0.0f32;
                for &(cx, cy) in &sub_cells {
                    if let Some(idx) = arena.cell_index(cx, cy) {
                        let cell = &arena.cells[idx];
                        player_count += cell.player_count as u32;
                        overload = overload.max(cell.overload);
                        total_points += cell.grid_points;
                    }
                }
                (player_count, overload, total_points)
            };

            let max_points = 3.0 * (0.2 + 1.2 * player_count as f32) * 1.1f32.powf(overload);
            if total_points >= max_points {
                continue;
            }

            for (cx, cy) in sub_cells {
                try_spawn_cell(world, arena_entity, biome, cx, cy);
            }
        }
    }
}

fn try_spawn_cell(world: &mut World, arena_entity: Entity, biome: u8, cx: i32, cy: i32) {
    let Some((spawn_at, difficulty, world_pos)) = (|| {
        let arena = world.get_arena(arena_entity)?;
        let idx = arena.cell_index(cx, cy)?;
        let cell = &arena.cells[idx];
        if cell.is_wall() {
            return None;
        }
        let difficulty_mod = cell.base_difficulty as f32;
        let player_mod = (1 + cell.player_count as u32) as f32;
        let spawn_at =
            difficulty_mod * 1.2f32.powf(cell.local_difficulty + cell.overload) / player_mod;
        let wx = (cx as f32 + 0.5) * arena.grid_size;
        let wy = (cy as f32 + 0.5) * arena.grid_size;
        Some((spawn_at, cell.local_difficulty + cell.base_difficulty as f32, (wx, wy)))
    })() else {
        return;
    };

    let timer_ready = {
        let Some(arena) = world.get_arena_mut(arena_entity) else { return };
        let Some(idx) = arena.cell_index(cx, cy) else { return };
        arena.cells[idx].spawn_timer += 1.0;
        arena.cells[idx].spawn_timer >= spawn_at
    };
    if !timer_ready {
        return;
    }

    // Broad-phase rejection: don't spawn on top of an existing entity.
    let too_close = world
        .get_arena_mut(arena_entity)
        .map(|arena| {
            arena
                .spatial_hash
                .find_nearest(world_pos.0, world_pos.1, 64.0, |_| true, |_| None)
                .is_some()
        })
        .unwrap_or(false);
    if too_close {
        return;
    }

    let zone_pick = world.get_arena(arena_entity).and_then(|a| {
        let cell = a.cell_at(world_pos.0, world_pos.1)?;
        cell.zone_spawner.map(|f| f(cell))
    });
    let mob_id = zone_pick
        .flatten()
        .unwrap_or_else(|| balance::pick_mob(balance::biome_table(biome)));
    let rarity = balance::roll_rarity(difficulty);
    let stats = balance::mob_stats(mob_id);

    let Ok(mob_entity) = world.alloc_entity() else { return };
    let _ = world.add_mob(mob_entity, Mob::new(mob_id, rarity));
    let _ = world.add_relations(mob_entity, Relations { team: Team::Mobs, ..Default::default() });
    let mut physical = crate::ecs::components::Physical {
        x: world_pos.0,
        y: world_pos.1,
        radius: stats.radius,
        arena: arena_entity,
        ..Default::default()
    };
    physical.mass = stats.radius;
    let _ = world.add_physical(mob_entity, physical);

    if let Some(arena) = world.get_arena_mut(arena_entity) {
        if let Some(idx) = arena.cell_index(cx, cy) {
            arena.cells[idx].grid_points += stats.difficulty_weight;
            arena.cells[idx].spawn_timer = 0.0;
        }
        arena.mob_count += 1;
    }
}
