//! Mob AI state machine (§4.4).

use crate::ecs::components::PhysicalFlags;
use crate::ecs::entity::Entity;
use crate::ecs::store::World;
use rysteria_protocol::ids::{AiState, Team};

const ATTACK_RADIUS: f32 = 40.0;
const AGGRO_SLACK: f32 = 200.0;
const RETURN_DISTANCE: f32 = 250.0;
const IDLE_COOLDOWN_TICKS: u32 = 25;

pub fn tick(world: &mut World) {
    let mobs: Vec<Entity> = world.for_each_ai().map(|(e, _)| e).collect();
    for e in mobs {
        step_mob(world, e);
    }
}

fn step_mob(world: &mut World, mob: Entity) {
    let Some(physical) = world.get_physical(mob).copied() else { return };
    if physical.stun_ticks > 0 {
        if let Some(ai) = world.get_ai_mut(mob) {
            ai.ticks_until_next_action = ai.ticks_until_next_action.saturating_sub(1);
        }
        return;
    }
    let no_aggro = physical.flags.contains(PhysicalFlags::NO_AGGRO);
    let arena = physical.arena;
    let team = world.get_relations(mob).map(|r| r.team).unwrap_or(Team::Mobs);

    let Some(mut ai) = world.get_ai(mob).copied() else { return };

    // Shared invalidation: dead/invisible/no-aggro/out-of-range target resets to idle.
    if let Some(target) = ai.target {
        let invalid = no_aggro
            || !world.entity_alive(target)
            || world.get_health(target).map(|h| h.is_dead()).unwrap_or(true)
            || world
                .get_physical(target)
                .map(|p| p.flags.contains(PhysicalFlags::INVISIBLE))
                .unwrap_or(true);
        if invalid {
            ai.target = None;
            ai.state = AiState::Idle;
            ai.ticks_until_next_action = IDLE_COOLDOWN_TICKS;
        }
    }

    match ai.state {
        AiState::Idle => {
            if ai.ticks_until_next_action == 0 {
                ai.state = AiState::Wander;
                ai.ticks_until_next_action = fastrand::u32(25..=75);
            } else {
                ai.ticks_until_next_action -= 1;
            }
        }
        AiState::Wander => {
            if let Some(p) = world.get_physical_mut(mob) {
                p.ax += fastrand::f32() * 2.0 - 1.0;
                p.ay += fastrand::f32() * 2.0 - 1.0;
            }
            if let Some(target) = find_target(world, mob, arena, team, ai.aggro_range, no_aggro) {
                ai.target = Some(target);
                ai.state = AiState::Chase;
            }
        }
        AiState::Chase => {
            let Some(target) = ai.target else {
                ai.state = AiState::Idle;
                ai.ticks_until_next_action = IDLE_COOLDOWN_TICKS;
                return commit(world, mob, ai);
            };
            let Some(tp) = world.get_physical(target).copied() else {
                ai.state = AiState::Idle;
                return commit(world, mob, ai);
            };
            let dx = tp.x - physical.x;
            let dy = tp.y - physical.y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > ai.aggro_range + AGGRO_SLACK {
                ai.target = None;
                ai.state = AiState::Idle;
                ai.ticks_until_next_action = IDLE_COOLDOWN_TICKS;
            } else if dist <= ATTACK_RADIUS {
                ai.state = AiState::Attack;
                ai.ticks_until_next_action = 10;
            } else if dist > 0.0001 {
                if let Some(p) = world.get_physical_mut(mob) {
                    p.ax += dx / dist * 0.6;
                    p.ay += dy / dist * 0.6;
                }
            }
        }
        AiState::Attack => {
            if ai.ticks_until_next_action == 0 {
                ai.state = AiState::Chase;
            } else {
                ai.ticks_until_next_action -= 1;
            }
        }
        AiState::Return => {
            let Some(target) = ai.target else {
                ai.state = AiState::Idle;
                return commit(world, mob, ai);
            };
            let Some(tp) = world.get_physical(target).copied() else {
                ai.state = AiState::Idle;
                return commit(world, mob, ai);
            };
            let dx = tp.x - physical.x;
            let dy = tp.y - physical.y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > RETURN_DISTANCE {
                if let Some(p) = world.get_physical_mut(mob) {
                    p.ax += dx / dist.max(0.0001) * 0.8;
                    p.ay += dy / dist.max(0.0001) * 0.8;
                }
            } else {
                ai.state = AiState::Idle;
            }
        }
        AiState::Bounce => {
            if let Some(p) = world.get_physical_mut(mob) {
                p.vx = -p.vx;
                p.vy = -p.vy;
            }
            ai.state = AiState::Idle;
            ai.ticks_until_next_action = IDLE_COOLDOWN_TICKS;
        }
    }

    commit(world, mob, ai);
}

fn commit(world: &mut World, mob: Entity, ai: crate::ecs::components::Ai) {
    if let Some(slot) = world.get_ai_mut(mob) {
        *slot = ai;
    }
}

/// Nearest enemy within `aggro_range`, broad-phased via the arena's spatial
/// hash (§4.4: "nearest enemy within aggro range and LOS per type"; LOS
/// itself is species-specific and out of scope for the shared core).
fn find_target(
    world: &mut World,
    mob: Entity,
    arena: Entity,
    team: Team,
    aggro_range: f32,
    no_aggro: bool,
) -> Option<Entity> {
    if no_aggro {
        return None;
    }
    let (x, y) = world.get_physical(mob).map(|p| (p.x, p.y))?;
    let candidates: Vec<Entity> = {
        let mut out = Vec::new();
        if let Some(arena_ref) = world.get_arena_mut(arena) {
            arena_ref.spatial_hash.query_rect(x, y, aggro_range * 2.0, aggro_range * 2.0, |e| out.push(e));
        }
        out
    };
    candidates
        .into_iter()
        .filter(|&e| e != mob)
        .filter(|&e| world.get_relations(e).map(|r| r.team != team).unwrap_or(false))
        .filter(|&e| world.has_flower(e) || world.has_mob(e))
        .filter_map(|e| {
            let p = world.get_physical(e)?;
            let d2 = (p.x - x).powi(2) + (p.y - y).powi(2);
            (d2 <= aggro_range * aggro_range).then_some((e, d2))
        })
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(e, _)| e)
}
