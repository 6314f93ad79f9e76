//! Squad room management (§4.7 `squad_*` headers, §GLOSSARY Squad, S3).
//!
//! Squads are their own entities carrying a [`Squad`] component; a
//! `PlayerInfo.squad` handle points back at one. Joining by code uses the
//! `<server_alias>-<code>` format from Scenario S3; `server_alias` is set by
//! the account sidecar's inbound tag 101 and lives on [`crate::account`].

use rysteria_protocol::packet::SquadFailReason;

use crate::ecs::components::{Squad, SquadMember};
use crate::ecs::entity::Entity;
use crate::ecs::store::World;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 16;

pub fn generate_code() -> String {
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[fastrand::usize(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Creates a new squad room and seats `player_info` as its owner.
pub fn create(world: &mut World, player_info: Entity, biome: u8) -> Result<Entity, SquadFailReason> {
    let Ok(squad_entity) = world.alloc_entity() else { return Err(SquadFailReason::InvalidSquad) };
    let mut squad = Squad::new(generate_code(), biome);
    squad.members[0] = SquadMember { player_info: Some(player_info), ..Default::default() };
    let _ = world.add_squad(squad_entity, squad);
    if let Some(info) = world.get_player_info_mut(player_info) {
        info.squad = Some(squad_entity);
        info.squad_pos = 0;
    }
    Ok(squad_entity)
}

/// Joins `player_info` into `squad_entity`'s first empty slot.
pub fn join(world: &mut World, squad_entity: Entity, player_info: Entity) -> Result<u8, SquadFailReason> {
    let Some(squad) = world.get_squad_mut(squad_entity) else { return Err(SquadFailReason::InvalidSquad) };
    let Some(slot) = squad.first_empty_slot() else { return Err(SquadFailReason::Full) };
    squad.members[slot] = SquadMember { player_info: Some(player_info), ..Default::default() };
    if let Some(info) = world.get_player_info_mut(player_info) {
        info.squad = Some(squad_entity);
        info.squad_pos = slot as u8;
    }
    Ok(slot as u8)
}

/// Resolves a join code of the form `<server_alias>-<code>` against every
/// live squad, per S3.
pub fn find_by_code<'a>(
    squads: impl Iterator<Item = (Entity, &'a Squad)>,
    server_alias: &str,
    presented: &str,
) -> Option<Entity> {
    let suffix = presented.strip_prefix(server_alias)?.strip_prefix('-')?;
    squads.filter(|(_, s)| s.code == suffix).map(|(e, _)| e).next()
}

pub fn leave(world: &mut World, player_info: Entity) {
    let Some(squad_entity) = world.get_player_info(player_info).and_then(|i| i.squad) else { return };
    if let Some(squad) = world.get_squad_mut(squad_entity) {
        squad.remove_member(player_info);
    }
    if let Some(info) = world.get_player_info_mut(player_info) {
        info.squad = None;
        info.squad_pos = 0;
    }
}

/// §9 Open Question: SANDBOX exempts devs from kicks; outside SANDBOX a
/// dev can be kicked like anyone else. Preserved literally per the
/// instruction not to silently "fix" this asymmetry.
pub fn kick(world: &mut World, squad_entity: Entity, kicker_slot: usize, target_slot: usize, sandbox: bool) -> bool {
    let Some(squad) = world.get_squad_mut(squad_entity) else { return false };
    if kicker_slot != squad.owner_slot {
        return false;
    }
    let Some(target) = squad.members.get(target_slot).copied() else { return false };
    if sandbox && target.is_dev {
        return false;
    }
    let Some(player_info) = target.player_info else { return false };
    squad.remove_member(player_info);
    if let Some(info) = world.get_player_info_mut(player_info) {
        info.squad = None;
        info.squad_pos = 0;
    }
    true
}

pub fn transfer_ownership(world: &mut World, squad_entity: Entity, current_owner_slot: usize, new_owner_slot: usize) -> bool {
    let Some(squad) = world.get_squad_mut(squad_entity) else { return false };
    if squad.owner_slot != current_owner_slot {
        return false;
    }
    if squad.members[new_owner_slot].player_info.is_none() {
        return false;
    }
    squad.owner_slot = new_owner_slot;
    true
}

/// Removes `player_info` from whichever squad it belongs to, if any; the
/// `World::sweep_deletions` free-hook calls this so a dropped client's
/// seat is freed for the next joiner.
pub fn remove_member_everywhere(world: &mut World, player_info: Entity) {
    let squads: Vec<Entity> = world.for_each_squad().map(|(e, _)| e).collect();
    for squad_entity in squads {
        if let Some(squad) = world.get_squad_mut(squad_entity) {
            squad.remove_member(player_info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_by_code_matches_alias_and_suffix() {
        let mut world = World::new();
        let player = world.alloc_entity().unwrap();
        world.add_player_info(player, Default::default()).unwrap();
        let squad_entity = create(&mut world, player, 0).unwrap();
        let code = world.get_squad(squad_entity).unwrap().code.clone();

        let presented = format!("my-server-{code}");
        let found = find_by_code(world.for_each_squad(), "my-server", &presented);
        assert_eq!(found, Some(squad_entity));
    }

    #[test]
    fn sandbox_mode_refuses_to_kick_devs() {
        let mut world = World::new();
        let owner = world.alloc_entity().unwrap();
        let dev = world.alloc_entity().unwrap();
        world.add_player_info(owner, Default::default()).unwrap();
        world.add_player_info(dev, Default::default()).unwrap();
        let squad_entity = create(&mut world, owner, 0).unwrap();
        join(&mut world, squad_entity, dev).unwrap();
        world.get_squad_mut(squad_entity).unwrap().members[1].is_dev = true;

        assert!(!kick(&mut world, squad_entity, 0, 1, true));
        assert!(kick(&mut world, squad_entity, 0, 1, false));
    }
}
