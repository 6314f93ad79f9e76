//! Per-client delta snapshot encoding (§4.7 `update`'s per-component
//! "count, then (entity-hash, state-bitmask, fields)" blocks).
//!
//! Each client keeps a [`ViewState`] recording what it was last told about
//! every entity in its view; an entity that just entered the view set is
//! re-sent in full (bitmask `ALL`), everything else only when a field
//! actually changed since last tick.

use rysteria_protocol::entity::WireEntity;
use rysteria_protocol::PacketWriter;

use crate::ecs::components::player_info::MAX_SLOTS;
use crate::ecs::components::{Health, Physical, PlayerInfo, SQUAD_SLOTS};
use crate::ecs::entity::Entity;
use crate::ecs::store::World;

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct PhysicalDirty: u8 {
        const X      = 0b0001;
        const Y      = 0b0010;
        const ANGLE  = 0b0100;
        const RADIUS = 0b1000;
        const ALL = Self::X.bits() | Self::Y.bits() | Self::ANGLE.bits() | Self::RADIUS.bits();
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct HealthDirty: u8 {
        const VALUE = 0b01;
        const MAX   = 0b10;
        const ALL = Self::VALUE.bits() | Self::MAX.bits();
    }
}

#[derive(Clone, Copy, Default)]
struct LastPhysical {
    x: f32,
    y: f32,
    angle: f32,
    radius: f32,
}

#[derive(Clone, Copy, Default)]
struct LastHealth {
    value: f32,
    max: f32,
}

/// What this client was last told about each entity in its view; absence
/// of a key means "not yet sent", i.e. force a full bitmask.
#[derive(Default)]
pub struct ViewState {
    physical: std::collections::HashMap<Entity, LastPhysical>,
    health: std::collections::HashMap<Entity, LastHealth>,
}

fn wire_entity(e: Entity) -> WireEntity {
    WireEntity { index: e.index() as u16, generation: e.generation() as u16 }
}

/// Writes the delta-encoded `physical` and `health` component blocks for
/// every entity in `view` into `w`, updating `state` for next tick.
pub fn write_delta(w: &mut PacketWriter, world: &World, view: &std::collections::HashSet<Entity>, state: &mut ViewState) {
    write_physical_block(w, world, view, state);
    write_health_block(w, world, view, state);
}

fn write_physical_block(w: &mut PacketWriter, world: &World, view: &std::collections::HashSet<Entity>, state: &mut ViewState) {
    let mut entries: Vec<(Entity, &Physical, PhysicalDirty)> = Vec::new();
    for &e in view {
        let Some(p) = world.get_physical(e) else { continue };
        let dirty = match state.physical.get(&e) {
            None => PhysicalDirty::ALL,
            Some(last) => {
                let mut d = PhysicalDirty::empty();
                d.set(PhysicalDirty::X, last.x != p.x);
                d.set(PhysicalDirty::Y, last.y != p.y);
                d.set(PhysicalDirty::ANGLE, last.angle != p.angle);
                d.set(PhysicalDirty::RADIUS, last.radius != p.radius);
                d
            }
        };
        if !dirty.is_empty() {
            entries.push((e, p, dirty));
        }
    }
    w.write_varuint(entries.len() as u64);
    for (e, p, dirty) in entries {
        wire_entity(e).write(w);
        w.write_u8(dirty.bits());
        if dirty.contains(PhysicalDirty::X) {
            w.write_f32(p.x);
        }
        if dirty.contains(PhysicalDirty::Y) {
            w.write_f32(p.y);
        }
        if dirty.contains(PhysicalDirty::ANGLE) {
            w.write_f32(p.angle);
        }
        if dirty.contains(PhysicalDirty::RADIUS) {
            w.write_f32(p.radius);
        }
        state.physical.insert(e, LastPhysical { x: p.x, y: p.y, angle: p.angle, radius: p.radius });
    }
}

fn write_health_block(w: &mut PacketWriter, world: &World, view: &std::collections::HashSet<Entity>, state: &mut ViewState) {
    let mut entries: Vec<(Entity, &Health, HealthDirty)> = Vec::new();
    for &e in view {
        let Some(h) = world.get_health(e) else { continue };
        let dirty = match state.health.get(&e) {
            None => HealthDirty::ALL,
            Some(last) => {
                let mut d = HealthDirty::empty();
                d.set(HealthDirty::VALUE, last.value != h.health);
                d.set(HealthDirty::MAX, last.max != h.max_health);
                d
            }
        };
        if !dirty.is_empty() {
            entries.push((e, h, dirty));
        }
    }
    w.write_varuint(entries.len() as u64);
    for (e, h, dirty) in entries {
        wire_entity(e).write(w);
        w.write_u8(dirty.bits());
        if dirty.contains(HealthDirty::VALUE) {
            w.write_f32(h.health);
        }
        if dirty.contains(HealthDirty::MAX) {
            w.write_f32(h.max_health);
        }
        state.health.insert(e, LastHealth { value: h.health, max: h.max_health });
    }
}

/// Assembles one client's full `update` packet (§4.7): the squad block
/// (4 member records plus the squad's own index/owner/position/private/
/// expose-code fields), then -- if the client has a live flower -- the
/// delta snapshot for its current view.
///
/// The exact field order beyond what §4.7 spells out (squad "index"
/// identifying which squad this is, as opposed to owner/position) isn't
/// pinned down by the spec; this uses the squad entity's raw index as that
/// identifier, which is this port's own call.
pub fn write_update(w: &mut PacketWriter, world: &World, player_info: Option<Entity>, tick_num: u64, state: &mut ViewState) {
    let info = player_info.and_then(|e| world.get_player_info(e));
    let squad_entity = info.and_then(|i| i.squad);
    let squad = squad_entity.and_then(|s| world.get_squad(s));

    w.write_i8(-1);
    for i in 0..SQUAD_SLOTS {
        let member = squad.map(|s| s.members[i]).unwrap_or_default();
        w.write_bool(member.player_info.is_some());
        w.write_bool(member.playing);
        w.write_bool(member.disconnected);
        w.write_bool(member.blocked);
        w.write_bool(member.is_dev);
        w.write_u8(member.kick_votes);
        let member_info = member.player_info.and_then(|e| world.get_player_info(e));
        let level = member.player_info.and_then(|e| world.get_flower(e)).map(|f| f.level).unwrap_or(0);
        w.write_varuint(level as u64);
        w.write_str("", 16);
        for slot_idx in 0..MAX_SLOTS {
            let (id, rarity) = member_info
                .map(|pi| pi.slots[slot_idx])
                .map(|s| (s.id as u8, s.rarity as u8))
                .unwrap_or((0, 0));
            w.write_u8(id);
            w.write_u8(rarity);
        }
    }
    w.write_u32(squad_entity.map(|e| e.index()).unwrap_or(0));
    w.write_u8(squad.map(|s| s.owner_slot as u8).unwrap_or(0));
    w.write_u8(info.map(|i| i.squad_pos).unwrap_or(0));
    w.write_bool(squad.map(|s| s.private).unwrap_or(false));
    w.write_bool(squad.map(|s| s.expose_code).unwrap_or(false));
    w.write_u8(squad.map(|s| s.biome).unwrap_or(0));
    w.write_str(squad.map(|s| s.code.as_str()).unwrap_or(""), 16);

    let in_game = info.map(|i| !i.flower.is_null()).unwrap_or(false);
    let afk = info
        .map(|i| tick_num.saturating_sub(i.last_input_change_tick) >= PlayerInfo::AFK_TICKS)
        .unwrap_or(false);
    w.write_bool(afk);
    w.write_bool(in_game);

    if in_game {
        let view = info.map(|i| i.entities_in_view.clone()).unwrap_or_default();
        write_delta(w, world, &view, state);
    }
}

/// Drops tracked state for entities no longer in view, so they re-send a
/// full bitmask if they ever re-enter (§4.7: "entities newly entering the
/// client's view set receive the full bitmask").
pub fn forget_out_of_view(state: &mut ViewState, view: &std::collections::HashSet<Entity>) {
    state.physical.retain(|e, _| view.contains(e));
    state.health.retain(|e, _| view.contains(e));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Physical;

    #[test]
    fn newly_viewed_entity_sends_full_bitmask_then_stays_quiet() {
        let mut world = World::new();
        let e = world.alloc_entity().unwrap();
        world.add_physical(e, Physical { x: 1.0, y: 2.0, ..Default::default() }).unwrap();
        let mut view = std::collections::HashSet::new();
        view.insert(e);
        let mut state = ViewState::default();

        let mut w1 = PacketWriter::new();
        write_delta(&mut w1, &world, &view, &mut state);
        assert!(w1.len() > 0);

        let mut w2 = PacketWriter::new();
        write_delta(&mut w2, &world, &view, &mut state);
        // Unchanged physical: just the two zero counts (no dirty entities).
        assert_eq!(w2.as_slice(), &[0u8, 0u8]);
    }
}
