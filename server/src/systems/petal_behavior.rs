//! Petal orbit, reload, and per-species effects (§4.5).
//!
//! Runs once per flower per tick, in the four passes the spec lays out:
//! modifiers, reload, rotation, effect. Petal instances are themselves
//! entities carrying `Physical` (for orbit position) and `Petal` (species
//! state); `PlayerInfo::slots[i].petals[j]` holds the back-reference.

use crate::balance;
use crate::ecs::components::player_info::MAX_PETALS_PER_SLOT;
use crate::ecs::components::{Ai, Health, Mob, Modifiers, Petal, PetalSlotRef, Physical, Relations};
use crate::ecs::entity::Entity;
use crate::ecs::store::World;
use rysteria_protocol::ids::{AiKind, AiState, MobId, PetalId, Rarity, Team};

const DEFEND_RADIUS: f32 = 20.0;
const IDLE_RADIUS: f32 = 50.0;
const ATTACK_RADIUS: f32 = 125.0;
const ACCEL_FACTOR: f32 = 0.5;
const BASE_ROTATION_SPEED: f32 = 0.04;

fn rarity_scale(rarity: Rarity) -> f32 {
    1.0 + rarity.as_u8() as f32 * 0.5
}

pub fn tick(world: &mut World, tick_num: u64) {
    let flowers: Vec<Entity> = world.for_each_player_info().map(|(e, _)| e).collect();
    for flower in flowers {
        modifiers_pass(world, flower);
        reload_pass(world, flower);
        rotation_pass(world, flower);
        effect_pass(world, flower, tick_num);
    }
}

fn modifiers_pass(world: &mut World, flower: Entity) {
    let Some(info) = world.get_player_info(flower) else { return };
    let mut modifiers = Modifiers::default();
    for slot in info.slots.iter().chain(info.secondary_slots.iter()) {
        let scale = rarity_scale(slot.rarity);
        match slot.id {
            PetalId::Leaf => modifiers.heal_per_tick += 0.4 * scale,
            PetalId::Feather => modifiers.speed_factor *= 1.0 + 0.2 * scale / (1.0 + 0.5 * scale),
            PetalId::Crest => modifiers.fov_min = modifiers.fov_min.max(1.2),
            PetalId::ThirdEye => modifiers.petal_extension += 30.0 * scale / (1.0 + 0.25 * scale),
            PetalId::Bone => {
                modifiers.damage_reduction_ratio =
                    1.0 - (1.0 - modifiers.damage_reduction_ratio) * (1.0 - 0.5 / (1.0 + 0.5 * scale))
            }
            PetalId::Berry => {
                modifiers.rotation_rate += 0.01 * scale;
                modifiers.reload_speed += 0.1 * scale;
            }
            PetalId::Magnet => modifiers.pickup_radius += 20.0 * scale / (1.0 + 0.25 * scale),
            PetalId::Droplet => modifiers.reverse_rotation = true,
            _ => {}
        }
    }
    if let Some(info) = world.get_player_info_mut(flower) {
        info.modifiers = modifiers;
    }
}

fn reload_pass(world: &mut World, flower: Entity) {
    let Some(info) = world.get_player_info(flower).cloned() else { return };
    let reload_speed = info.modifiers.reload_speed.max(0.1);
    for secondary in [false, true] {
        let slot_count = info.slot_count;
        for slot_index in 0..slot_count {
            for petal_index in 0..MAX_PETALS_PER_SLOT {
                let (entity, cooldown, id, rarity) = {
                    let slot = if secondary {
                        &info.secondary_slots[slot_index]
                    } else {
                        &info.slots[slot_index]
                    };
                    (slot.petals[petal_index], slot.cooldown_ticks, slot.id, slot.rarity)
                };
                if !entity.is_null() && world.entity_alive(entity) {
                    continue;
                }
                let remaining = cooldown.saturating_sub(reload_speed as u32);
                if remaining > 0 {
                    set_cooldown(world, flower, secondary, slot_index, remaining);
                    continue;
                }
                spawn_petal(world, flower, secondary, slot_index, petal_index, id, rarity);
                let stats = balance::petal_stats(id);
                set_cooldown(world, flower, secondary, slot_index, stats.cooldown_ticks);
            }
        }
    }
}

fn set_cooldown(world: &mut World, flower: Entity, secondary: bool, slot_index: usize, value: u32) {
    if let Some(info) = world.get_player_info_mut(flower) {
        let slot = if secondary {
            &mut info.secondary_slots[slot_index]
        } else {
            &mut info.slots[slot_index]
        };
        slot.cooldown_ticks = value;
    }
}

fn spawn_petal(
    world: &mut World,
    flower: Entity,
    secondary: bool,
    slot_index: usize,
    petal_index: usize,
    id: PetalId,
    rarity: Rarity,
) {
    let Ok(petal_entity) = world.alloc_entity() else { return };
    let mut petal = Petal::new(id, rarity);
    petal.slot = Some(PetalSlotRef { flower, slot_index, petal_index, secondary });
    let _ = world.add_petal(petal_entity, petal);
    let owner_relations = world.get_relations(flower).copied().unwrap_or_default();
    let _ = world.add_relations(
        petal_entity,
        Relations { team: owner_relations.team, owner: flower, root_owner: owner_relations.root_owner, nest: None },
    );
    let stats = balance::petal_stats(id);
    let arena = world.get_physical(flower).map(|p| p.arena).unwrap_or(Entity::NULL);
    let _ = world.add_physical(
        petal_entity,
        Physical { radius: stats.radius, arena, ..Default::default() },
    );
    let _ = world.add_health(petal_entity, Health { health: 1.0, max_health: 1.0, damage: 1.0, ..Default::default() });

    if let Some(info) = world.get_player_info_mut(flower) {
        let slot = if secondary {
            &mut info.secondary_slots[slot_index]
        } else {
            &mut info.slots[slot_index]
        };
        slot.petals[petal_index] = petal_entity;
    }
}

fn rotation_pass(world: &mut World, flower: Entity) {
    let Some(flower_physical) = world.get_physical(flower).copied() else { return };
    let Some(info) = world.get_player_info(flower).cloned() else { return };

    let sign = if info.modifiers.reverse_rotation { -1.0 } else { 1.0 };
    let rotation = info.rotation_counter + info.modifiers.rotation_rate * sign;
    if let Some(info) = world.get_player_info_mut(flower) {
        info.rotation_counter = rotation;
    }

    let radius = if info.input.contains(crate::ecs::components::InputFlags::DEFENDING) {
        DEFEND_RADIUS
    } else if info.input.contains(crate::ecs::components::InputFlags::ATTACKING) {
        ATTACK_RADIUS + info.modifiers.petal_extension
    } else {
        IDLE_RADIUS
    };

    let total_petals: usize = info
        .slots
        .iter()
        .take(info.slot_count)
        .flat_map(|s| s.petals.iter())
        .filter(|e| !e.is_null())
        .count()
        .max(1);

    let mut phase_index = 0usize;
    for slot in info.slots.iter().take(info.slot_count) {
        for &petal_entity in &slot.petals {
            if petal_entity.is_null() {
                continue;
            }
            let is_detached = world.get_petal(petal_entity).map(|p| p.detached).unwrap_or(true);
            if is_detached {
                phase_index += 1;
                continue;
            }
            let theta = rotation + phase_index as f32 * std::f32::consts::TAU / total_petals as f32;
            let target_x = flower_physical.x + radius * theta.cos();
            let target_y = flower_physical.y + radius * theta.sin();
            if let Some(p) = world.get_physical_mut(petal_entity) {
                let dx = target_x - p.x;
                let dy = target_y - p.y;
                p.ax += dx * ACCEL_FACTOR;
                p.ay += dy * ACCEL_FACTOR;
                let no_rotation = world
                    .get_petal(petal_entity)
                    .map(|petal| petal.id == PetalId::Gravel)
                    .unwrap_or(false);
                if !no_rotation {
                    if let Some(p) = world.get_physical_mut(petal_entity) {
                        p.angular_velocity = BASE_ROTATION_SPEED;
                    }
                }
            }
            phase_index += 1;
        }
    }
}

fn effect_pass(world: &mut World, flower: Entity, tick_num: u64) {
    let Some(info) = world.get_player_info(flower).cloned() else { return };
    if info.modifiers.heal_per_tick > 0.0 {
        if let Some(h) = world.get_health_mut(flower) {
            h.heal(info.modifiers.heal_per_tick);
        }
    }
    let petals: Vec<Entity> = info
        .slots
        .iter()
        .chain(info.secondary_slots.iter())
        .flat_map(|s| s.petals.iter().copied())
        .filter(|e| !e.is_null())
        .collect();
    let attacking = info.input.contains(crate::ecs::components::InputFlags::ATTACKING);
    for petal_entity in petals {
        run_effect(world, flower, petal_entity, attacking, tick_num);
    }
}

fn run_effect(world: &mut World, flower: Entity, petal_entity: Entity, attacking: bool, tick_num: u64) {
    let Some(petal) = world.get_petal(petal_entity).copied() else { return };
    let Some(physical) = world.get_physical(petal_entity).copied() else { return };
    match petal.id {
        PetalId::Shell => {
            if attacking && !petal.detached {
                if let Some(target) = nearest_enemy(world, physical.arena, flower, physical.x, physical.y, 750.0) {
                    if let (Some(tp), Some(p)) = (world.get_physical(target).copied(), world.get_physical_mut(petal_entity))
                    {
                        let dx = tp.x - p.x;
                        let dy = tp.y - p.y;
                        let d = (dx * dx + dy * dy).sqrt().max(0.0001);
                        p.vx = dx / d * 15.0;
                        p.vy = dy / d * 15.0;
                    }
                }
                mark_detached(world, petal_entity, 75);
            }
        }
        PetalId::Peas => {
            if attacking && !petal.detached {
                for i in 0..3 {
                    let angle = i as f32 * std::f32::consts::TAU / 3.0;
                    spawn_sibling_projectile(world, petal_entity, &petal, angle, 50.0);
                }
                mark_detached(world, petal_entity, 60);
            }
        }
        PetalId::Azalea => {
            if let Some(target) = nearest_damaged_ally_flower(world, flower, physical.x, physical.y, 400.0) {
                if entities_touching(world, petal_entity, target) {
                    if let Some(h) = world.get_health_mut(target) {
                        h.heal(9.0 * rarity_scale(petal.rarity));
                    }
                }
            }
        }
        PetalId::Web => {
            if attacking && !petal.detached {
                let _ = world.add_web(petal_entity, crate::ecs::components::Web { radius: 90.0, ticks_until_despawn: 250 });
                mark_detached(world, petal_entity, 1);
            }
        }
        PetalId::Meat => {
            if attacking && !petal.detached {
                aggro_nearby_mobs(world, petal_entity, &petal, physical.x, physical.y);
                mark_detached(world, petal_entity, 1);
            }
        }
        PetalId::Nest => {
            if info_defending(world, flower) {
                let _ = world.alloc_entity().map(|nest_entity| {
                    let _ = world.add_nest(nest_entity, crate::ecs::components::Nest::new(petal.rarity));
                });
            }
        }
        PetalId::Seed => {
            if petal.bind_target.is_none() {
                if let Some(target) = nearest_dead_ally_flower(world, flower, physical.x, physical.y, 200.0) {
                    if let Some(p) = world.get_petal_mut(petal_entity) {
                        p.bind_target = Some(target);
                    }
                }
            }
        }
        PetalId::Gravel => {
            if attacking && !petal.detached {
                mark_detached(world, petal_entity, 65);
            }
        }
        PetalId::Mint => {
            if let Some(target) = nearest_damaged_friendly_mob(world, flower, physical.x, physical.y, 150.0) {
                if entities_touching(world, petal_entity, target) {
                    if let Some(h) = world.get_health_mut(target) {
                        h.heal(15.0 * rarity_scale(petal.rarity));
                    }
                }
            }
        }
        PetalId::Bubble => {
            if info_defending(world, flower) {
                if let Some(p) = world.get_physical_mut(flower) {
                    let boost = 12.0 * (petal.rarity.as_u8() as f32 + 1.0);
                    let norm = (p.vx * p.vx + p.vy * p.vy).sqrt().max(0.0001);
                    p.vx += p.vx / norm * boost;
                    p.vy += p.vy / norm * boost;
                }
                world.request_deletion(petal_entity);
            }
        }
        PetalId::Egg => {
            if petal.effect_delay_ticks == 0 {
                hatch_trex(world, flower, &petal, physical.x, physical.y);
                world.request_deletion(petal_entity);
            } else if let Some(p) = world.get_petal_mut(petal_entity) {
                p.effect_delay_ticks -= 1;
            }
        }
        PetalId::Fireball | PetalId::Meteor => {
            if attacking && !petal.detached {
                if let Some(p) = world.get_physical_mut(petal_entity) {
                    p.vx *= 1.05;
                    p.vy *= 1.05;
                }
                mark_detached(world, petal_entity, 100);
            }
        }
        PetalId::Uranium => {
            if tick_num % 50 == 0 {
                area_damage(world, petal_entity, &petal, physical.x, physical.y, flower, tick_num);
            }
        }
        _ => {}
    }
}

fn mark_detached(world: &mut World, petal_entity: Entity, effect_delay: u32) {
    if let Some(p) = world.get_petal_mut(petal_entity) {
        p.detached = true;
        p.effect_delay_ticks = effect_delay;
    }
}

fn info_defending(world: &World, flower: Entity) -> bool {
    world
        .get_player_info(flower)
        .map(|info| info.input.contains(crate::ecs::components::InputFlags::DEFENDING))
        .unwrap_or(false)
}

fn entities_touching(world: &World, a: Entity, b: Entity) -> bool {
    let (Some(pa), Some(pb)) = (world.get_physical(a), world.get_physical(b)) else { return false };
    let d2 = (pa.x - pb.x).powi(2) + (pa.y - pb.y).powi(2);
    d2 <= (pa.radius + pb.radius).powi(2)
}

fn nearest_enemy(world: &mut World, arena: Entity, flower: Entity, x: f32, y: f32, radius: f32) -> Option<Entity> {
    let team = world.get_relations(flower).map(|r| r.team)?;
    find_in_radius(world, arena, x, y, radius, |world, e| {
        e != flower && world.get_relations(e).map(|r| r.team != team).unwrap_or(false)
    })
}

fn nearest_damaged_ally_flower(world: &mut World, flower: Entity, x: f32, y: f32, radius: f32) -> Option<Entity> {
    let team = world.get_relations(flower).map(|r| r.team)?;
    let arena = world.get_physical(flower).map(|p| p.arena)?;
    find_in_radius(world, arena, x, y, radius, |world, e| {
        world.has_flower(e)
            && world.get_relations(e).map(|r| r.team == team).unwrap_or(false)
            && world.get_health(e).map(|h| h.health < h.max_health).unwrap_or(false)
    })
}

fn nearest_dead_ally_flower(world: &mut World, flower: Entity, x: f32, y: f32, radius: f32) -> Option<Entity> {
    let team = world.get_relations(flower).map(|r| r.team)?;
    let arena = world.get_physical(flower).map(|p| p.arena)?;
    find_in_radius(world, arena, x, y, radius, |world, e| {
        world
            .get_flower(e)
            .map(|f| f.dead)
            .unwrap_or(false)
            && world.get_relations(e).map(|r| r.team == team).unwrap_or(false)
    })
}

fn nearest_damaged_friendly_mob(world: &mut World, flower: Entity, x: f32, y: f32, radius: f32) -> Option<Entity> {
    let team = world.get_relations(flower).map(|r| r.team)?;
    let arena = world.get_physical(flower).map(|p| p.arena)?;
    find_in_radius(world, arena, x, y, radius, |world, e| {
        world.has_mob(e)
            && world.get_relations(e).map(|r| r.team == team).unwrap_or(false)
            && world.get_health(e).map(|h| h.health < h.max_health).unwrap_or(false)
    })
}

fn find_in_radius(
    world: &mut World,
    arena: Entity,
    x: f32,
    y: f32,
    radius: f32,
    filter: impl Fn(&World, Entity) -> bool,
) -> Option<Entity> {
    let candidates: Vec<Entity> = {
        let mut out = Vec::new();
        if let Some(a) = world.get_arena_mut(arena) {
            a.spatial_hash.query_rect(x, y, radius * 2.0, radius * 2.0, |e| out.push(e));
        }
        out
    };
    candidates
        .into_iter()
        .filter(|&e| filter(world, e))
        .filter_map(|e| {
            let p = world.get_physical(e)?;
            let d2 = (p.x - x).powi(2) + (p.y - y).powi(2);
            (d2 <= radius * radius).then_some((e, d2))
        })
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(e, _)| e)
}

fn spawn_sibling_projectile(world: &mut World, source: Entity, petal: &Petal, angle: f32, speed: f32) {
    let Some(source_physical) = world.get_physical(source).copied() else { return };
    let Ok(sibling) = world.alloc_entity() else { return };
    let mut sibling_petal = Petal::new(petal.id, petal.rarity);
    sibling_petal.detached = true;
    let _ = world.add_petal(sibling, sibling_petal);
    let mut physical = source_physical;
    physical.vx = speed * angle.cos();
    physical.vy = speed * angle.sin();
    let _ = world.add_physical(sibling, physical);
}

fn aggro_nearby_mobs(world: &mut World, petal_entity: Entity, petal: &Petal, x: f32, y: f32) {
    let Some(physical) = world.get_physical(petal_entity).copied() else { return };
    let max_targets = (10 + petal.rarity.as_u8() as u32) as usize;
    let radius = 300.0 + 100.0 * petal.rarity.as_u8() as f32;
    let candidates: Vec<Entity> = {
        let mut out = Vec::new();
        if let Some(arena) = world.get_arena_mut(physical.arena) {
            arena.spatial_hash.query_rect(x, y, radius * 2.0, radius * 2.0, |e| out.push(e));
        }
        out
    };
    let targets: Vec<Entity> = candidates.into_iter().filter(|&e| world.has_mob(e)).take(max_targets).collect();
    for e in targets {
        if let Some(ai) = world.get_ai_mut(e) {
            ai.state = AiState::Chase;
        }
    }
}

fn hatch_trex(world: &mut World, flower: Entity, petal: &Petal, x: f32, y: f32) {
    let Some(physical) = world.get_physical(flower).copied() else { return };
    let Ok(mob_entity) = world.alloc_entity() else { return };
    let mut mob = Mob::new(MobId::TRex, petal.rarity);
    mob.player_spawned = true;
    let _ = world.add_mob(mob_entity, mob);
    let owner_relations = world.get_relations(flower).copied().unwrap_or_default();
    let _ = world.add_relations(
        mob_entity,
        Relations { team: owner_relations.team, owner: flower, root_owner: owner_relations.root_owner, nest: None },
    );
    let stats = balance::mob_stats(MobId::TRex);
    let _ = world.add_physical(
        mob_entity,
        Physical { x, y, radius: stats.radius, arena: physical.arena, ..Default::default() },
    );
    let _ = world.add_health(mob_entity, Health { health: stats.base_health, max_health: stats.base_health, damage: stats.damage, ..Default::default() });
    let _ = world.add_ai(mob_entity, Ai { kind: AiKind::Aggro, target: Some(flower), state: AiState::Return, ..Default::default() });
}

fn area_damage(world: &mut World, petal_entity: Entity, petal: &Petal, x: f32, y: f32, owner: Entity, tick_num: u64) {
    let Some(physical) = world.get_physical(petal_entity).copied() else { return };
    let radius = 120.0 + 20.0 * petal.rarity.as_u8() as f32;
    let base_damage = 6.0 * rarity_scale(petal.rarity);
    let owner_team = world.get_relations(owner).map(|r| r.team).unwrap_or(Team::Players);
    let candidates: Vec<Entity> = {
        let mut out = Vec::new();
        if let Some(arena) = world.get_arena_mut(physical.arena) {
            arena.spatial_hash.query_rect(x, y, radius * 2.0, radius * 2.0, |e| out.push(e));
        }
        out
    };
    for e in candidates {
        if e == owner {
            if let Some(h) = world.get_health_mut(owner) {
                h.apply_damage(base_damage * 3.0, None, tick_num);
            }
            continue;
        }
        let enemy = world.get_relations(e).map(|r| r.team != owner_team).unwrap_or(false);
        if enemy {
            if let Some(h) = world.get_health_mut(e) {
                h.apply_damage(base_damage, None, tick_num);
            }
        }
    }
}
