//! Broad + narrow phase collision (§4.6).
//!
//! Rebuilds each arena's spatial hash fresh every tick from its member
//! `Physical`s, then walks candidate pairs the hash reports. Resolution
//! reads/writes components one entity at a time (never two simultaneously)
//! since the ECS only hands out one mutable borrow per call; colliding pairs
//! are processed by cloning out the numbers needed, computing the result,
//! then writing each side back.

use crate::ecs::components::Relations;
use crate::ecs::entity::Entity;
use crate::ecs::store::World;
use crate::spatial::grid::Bounds;

struct Candidate {
    entity: Entity,
    x: f32,
    y: f32,
    radius: f32,
}

/// §5 order step "collision-detection": rebuilds every arena's spatial hash
/// from this tick's `Physical`s and returns every overlapping pair. Kept
/// separate from [`resolve`] so AI/drops/petal-behavior can run on the same
/// hash before resolution mutates positions.
pub fn detect(world: &mut World) -> Vec<(Entity, Entity)> {
    let arenas: Vec<Entity> = world.for_each_arena().map(|(e, _)| e).collect();
    let mut pairs = Vec::new();
    for arena_entity in arenas {
        pairs.extend(detect_arena(world, arena_entity));
    }
    pairs
}

fn detect_arena(world: &mut World, arena_entity: Entity) -> Vec<(Entity, Entity)> {
    let members: Vec<Candidate> = world
        .for_each_physical()
        .filter(|(_, p)| p.arena == arena_entity && !p.is_deleting())
        .map(|(e, p)| Candidate { entity: e, x: p.x, y: p.y, radius: p.radius })
        .collect();

    let Some(arena) = world.get_arena_mut(arena_entity) else { return Vec::new() };
    arena.spatial_hash.clear();
    for c in &members {
        arena.spatial_hash.insert(
            c.entity,
            &Bounds { x: c.x, y: c.y, half_w: c.radius, half_h: c.radius },
        );
    }

    let mut pairs: Vec<(Entity, Entity)> = Vec::new();
    for c in &members {
        let Some(arena) = world.get_arena_mut(arena_entity) else { return pairs };
        let mut nearby = Vec::new();
        arena
            .spatial_hash
            .query_rect(c.x, c.y, c.radius * 4.0, c.radius * 4.0, |e| nearby.push(e));
        for other in nearby {
            if other.index() > c.entity.index() {
                pairs.push((c.entity, other));
            }
        }
    }
    pairs
}

/// §5 order step "collision-resolution": applies the §4.6 pair rules to
/// pairs captured by an earlier [`detect`] call, then each entity's wall
/// cell (which only needs its own position, not a pair).
pub fn resolve(world: &mut World, pairs: &[(Entity, Entity)], tick_num: u64) {
    for &(a, b) in pairs {
        resolve_pair(world, a, b, tick_num);
    }

    let arenas: Vec<Entity> = world.for_each_arena().map(|(e, _)| e).collect();
    for arena_entity in arenas {
        wall_collision(world, arena_entity);
    }
}

fn resolve_pair(world: &mut World, a: Entity, b: Entity, tick_num: u64) {
    let (Some(pa), Some(pb)) = (world.get_physical(a).copied(), world.get_physical(b).copied())
    else {
        return;
    };
    let dx = pa.x - pb.x;
    let dy = pa.y - pb.y;
    let dist = (dx * dx + dy * dy).sqrt();
    let d = dist - (pa.radius + pb.radius);
    if d > 0.0 {
        return;
    }
    let (nx, ny) = if dist > 0.0001 { (dx / dist, dy / dist) } else { (1.0, 0.0) };

    let ra = world.get_relations(a).copied().unwrap_or_default();
    let rb = world.get_relations(b).copied().unwrap_or_default();
    let a_is_petal = world.has_petal(a);
    let b_is_petal = world.has_petal(b);
    let a_is_mob = world.has_mob(a);
    let b_is_mob = world.has_mob(b);
    let a_is_flower = world.has_flower(a);
    let b_is_flower = world.has_flower(b);

    if ra.team == rb.team && !a_is_petal && !b_is_petal {
        push_apart(world, a, b, nx, ny, d);
        return;
    }

    if (a_is_petal && (b_is_flower || b_is_mob) && ra.team == rb.team)
        || (b_is_petal && (a_is_flower || a_is_mob) && ra.team == rb.team)
    {
        return;
    }

    // Petal vs enemy: mutual damage, credited to the root owner's squad.
    if (a_is_petal && ra.team != rb.team) || (b_is_petal && ra.team != rb.team) {
        let (petal_entity, petal_relations, target) = if a_is_petal { (a, ra, b) } else { (b, rb, a) };
        apply_mutual_damage(world, petal_entity, target, petal_relations, tick_num);
        return;
    }

    // Mob vs enemy flower.
    if (a_is_mob && b_is_flower && ra.team != rb.team)
        || (b_is_mob && a_is_flower && ra.team != rb.team)
    {
        let (mob, flower) = if a_is_mob { (a, b) } else { (b, a) };
        apply_mutual_damage_simple(world, mob, flower, tick_num);
    }
}

fn push_apart(world: &mut World, a: Entity, b: Entity, nx: f32, ny: f32, d: f32) {
    let push = -d * 0.5;
    if let Some(pa) = world.get_physical_mut(a) {
        pa.x += nx * push;
        pa.y += ny * push;
    }
    if let Some(pb) = world.get_physical_mut(b) {
        pb.x -= nx * push;
        pb.y -= ny * push;
    }
}

fn apply_mutual_damage(world: &mut World, petal: Entity, target: Entity, petal_relations: Relations, tick_num: u64) {
    let Some(target_health) = world.get_health(target).copied() else { return };
    let Some(petal_health) = world.get_health(petal).copied() else { return };
    let squad_slot = squad_slot_of(world, petal_relations.root_owner);

    let mut target_health = target_health;
    target_health.apply_damage(petal_health.damage, squad_slot, tick_num);
    if let Some(h) = world.get_health_mut(target) {
        *h = target_health;
    }

    let mut petal_health = petal_health;
    petal_health.apply_damage(target_health.damage, None, tick_num);
    if let Some(h) = world.get_health_mut(petal) {
        *h = petal_health;
    }
}

fn apply_mutual_damage_simple(world: &mut World, mob: Entity, flower: Entity, tick_num: u64) {
    let Some(mob_health) = world.get_health(mob).copied() else { return };
    let Some(flower_health) = world.get_health(flower).copied() else { return };
    if mob_physical_has_no_aggro(world, mob) {
        return;
    }

    let mut flower_health = flower_health;
    let root_owner = world.get_relations(flower).map(|r| r.root_owner).unwrap_or(Entity::NULL);
    let squad_slot = squad_slot_of(world, root_owner);
    flower_health.apply_damage(mob_health.damage, squad_slot, tick_num);
    if let Some(h) = world.get_health_mut(flower) {
        *h = flower_health;
    }

    let mut mob_health = mob_health;
    mob_health.apply_damage(flower_health.damage, None, tick_num);
    if let Some(h) = world.get_health_mut(mob) {
        *h = mob_health;
    }
}

fn mob_physical_has_no_aggro(world: &World, mob: Entity) -> bool {
    world
        .get_physical(mob)
        .map(|p| p.flags.contains(crate::ecs::components::PhysicalFlags::NO_AGGRO))
        .unwrap_or(false)
}

/// Player-info slot index of `owner` within its squad, if any; used as the
/// `Health::squad_damage` index (§3 invariant).
fn squad_slot_of(world: &World, owner: Entity) -> Option<usize> {
    world.get_player_info(owner).map(|p| p.squad_pos as usize)
}

fn wall_collision(world: &mut World, arena_entity: Entity) {
    let grid_size = match world.get_arena(arena_entity) {
        Some(a) => a.grid_size,
        None => return,
    };
    let members: Vec<Entity> = world
        .for_each_physical()
        .filter(|(_, p)| p.arena == arena_entity)
        .map(|(e, _)| e)
        .collect();
    for e in members {
        let Some(physical) = world.get_physical(e).copied() else { continue };
        if physical.flags.contains(crate::ecs::components::PhysicalFlags::NO_WALL_COLLISION) {
            continue;
        }
        let Some(arena) = world.get_arena(arena_entity) else { continue };
        let (cx, cy) = arena.world_to_cell(physical.x, physical.y);
        let Some(idx) = arena.cell_index(cx, cy) else { continue };
        if !arena.cells[idx].is_wall() {
            continue;
        }
        let cell_cx = (cx as f32 + 0.5) * grid_size;
        let cell_cy = (cy as f32 + 0.5) * grid_size;
        let half = grid_size / 2.0;
        let dx = physical.x - cell_cx;
        let dy = physical.y - cell_cy;
        let overlap_x = half + physical.radius - dx.abs();
        let overlap_y = half + physical.radius - dy.abs();
        if let Some(p) = world.get_physical_mut(e) {
            if overlap_x < overlap_y {
                p.x += overlap_x * dx.signum();
            } else {
                p.y += overlap_y * dy.signum();
            }
        }
    }
}
