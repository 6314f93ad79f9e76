//! Serverbound packet dispatch (§4.7's header table).
//!
//! The very first frame a client sends is the plaintext login packet
//! (nonce, verification echo, rivet token, uuid, dev flag); every frame
//! after that is `quick_verification`-checked and header-dispatched the
//! way `original_source/Server/Server.c` does it around its read loop
//! (lines ~560-720): decrypt with the serverbound rolling key, advance
//! `quick_verification` and compare *before* looking at the header byte,
//! then switch on the header.

use rysteria_protocol::crypto::roll_quick_verification;
use rysteria_protocol::ids::{PetalId, Rarity, Team};
use rysteria_protocol::packet::{ClientboundHeader, ServerboundHeader, SquadFailReason};
use rysteria_protocol::{PacketReader, PacketWriter};

use crate::account::prd;
use crate::balance;
use crate::config::ServerConfig;
use crate::ecs::components::player_info::MAX_PETALS_PER_SLOT;
use crate::ecs::components::{Flower, Health, InputFlags, PlayerInfo, Physical, Relations};
use crate::ecs::entity::Entity;
use crate::ecs::store::World;
use crate::squad;

use super::client::ServerClient;

/// Entry point called once per buffered frame (§5: "applied at the start
/// of tick N+1 in socket-arrival order").
pub fn handle_frame(world: &mut World, config: &ServerConfig, client: &mut ServerClient, default_arena: Entity, tick_num: u64, payload: &[u8]) {
    if !client.received_first_packet {
        handle_login(world, client, payload);
        return;
    }

    let mut data = payload.to_vec();
    client.serverbound_key.apply_then_advance_twice(&mut data);

    let mut r = PacketReader::new(&data);
    let Ok(qv) = r.read_u8("quick_verification") else { return };
    client.quick_verification = roll_quick_verification(client.quick_verification);
    if qv != client.quick_verification {
        client.pending_kick = true;
        return;
    }

    let Ok(header_byte) = r.read_u8("header") else { return };
    let Ok(header) = ServerboundHeader::from_u8(header_byte) else { return };
    match header {
        ServerboundHeader::Input => handle_input(world, client, tick_num, &mut r),
        ServerboundHeader::PetalSwitch => handle_petal_switch(world, client, &mut r),
        ServerboundHeader::SquadJoin => handle_squad_join(world, config, client, &mut r),
        ServerboundHeader::SquadReady => handle_squad_ready(world, client, default_arena),
        ServerboundHeader::SquadUpdate => handle_squad_update(world, client, &mut r),
        ServerboundHeader::PrivateUpdate => handle_private_update(world, client, &mut r),
        ServerboundHeader::ExposeCodeUpdate => handle_expose_code_update(world, client, &mut r),
        ServerboundHeader::SquadKick => handle_squad_kick(world, config, client, &mut r),
        ServerboundHeader::SquadTransferOwnership => handle_transfer_ownership(world, client, &mut r),
        ServerboundHeader::PetalsCraft => handle_petals_craft(client, &mut r),
        ServerboundHeader::Chat => handle_chat(client, &mut r),
        ServerboundHeader::ChatBlock => handle_chat_block(world, client, &mut r),
        ServerboundHeader::DevCheat => handle_dev_cheat(client, &mut r),
    }
}

/// The login packet isn't yet under rolling-key encryption (§4.7): it's
/// read plaintext, and the very act of accepting it flips
/// `received_first_packet` so every later frame goes through the
/// decrypt-then-verify path above.
fn handle_login(world: &mut World, client: &mut ServerClient, payload: &[u8]) {
    let mut r = PacketReader::new(payload);
    let Ok(_nonce) = r.read_u64("login.nonce") else { return };
    let Ok(echoed) = r.read_u64("login.verification_echo") else { return };
    if echoed != client.requested_verification {
        client.pending_kick = true;
        return;
    }
    let Ok(_rivet_token) = r.read_str(300, "login.rivet_token") else { return };
    let Ok(uuid) = r.read_str(100, "login.uuid") else { return };
    let Ok(dev_flag) = r.read_varuint("login.dev_flag") else { return };

    client.uuid = uuid;
    client.is_dev = dev_flag != 0;
    client.received_first_packet = true;

    if client.player_info.is_none() {
        if let Ok(player_info_entity) = world.alloc_entity() {
            let _ = world.add_player_info(player_info_entity, PlayerInfo::default());
            client.player_info = Some(player_info_entity);
        }
    }

    let mut w = PacketWriter::new();
    w.write_u8(ClientboundHeader::AccountResult as u8);
    w.write_str(&client.uuid, 64);
    client.queue_message(w.into_vec());
}

/// §4.7 `input`: `MOUSE_MODE` unset reads the four direction bits (same
/// scheme as the original's `movementFlags` switch with bit 6 clear);
/// set, it reads a relative mouse offset scaled by
/// `clamp((magnitude-25)/50, 0, 1)`, matching `Server.c`'s mouse-input
/// branch.
fn handle_input(world: &mut World, client: &ServerClient, tick_num: u64, r: &mut PacketReader) {
    let Some(player_info_entity) = client.player_info else { return };
    let Ok(flags_byte) = r.read_u8("input.flags") else { return };
    let flags = InputFlags::from_bits_truncate(flags_byte);

    let (mut dir_x, mut dir_y) = (0.0f32, 0.0f32);
    let (mouse_x, mouse_y);
    if flags.contains(InputFlags::MOUSE_MODE) {
        let Ok(mx) = r.read_f32("input.mouse_x") else { return };
        let Ok(my) = r.read_f32("input.mouse_y") else { return };
        mouse_x = mx as i32;
        mouse_y = my as i32;
        let magnitude = (mx * mx + my * my).sqrt();
        let scale = ((magnitude - 25.0) / 50.0).clamp(0.0, 1.0);
        if magnitude > 0.0 {
            dir_x = mx / magnitude * scale;
            dir_y = my / magnitude * scale;
        }
    } else {
        mouse_x = 0;
        mouse_y = 0;
        if flags.contains(InputFlags::MOVE_UP) {
            dir_y -= 1.0;
        }
        if flags.contains(InputFlags::MOVE_DOWN) {
            dir_y += 1.0;
        }
        if flags.contains(InputFlags::MOVE_LEFT) {
            dir_x -= 1.0;
        }
        if flags.contains(InputFlags::MOVE_RIGHT) {
            dir_x += 1.0;
        }
        let mag = (dir_x * dir_x + dir_y * dir_y).sqrt();
        if mag > 0.0 {
            dir_x /= mag;
            dir_y /= mag;
        }
    }

    let speed = balance::PLAYER_SPEED * client.dev_cheats.speed_percent;

    let Some(info) = world.get_player_info_mut(player_info_entity) else { return };
    info.input = flags;
    info.mouse_x = mouse_x as f32;
    info.mouse_y = mouse_y as f32;
    let afk = info.note_input_and_check_afk(tick_num, mouse_x, mouse_y);
    let flower = info.flower;
    if afk || flower.is_null() {
        return;
    }
    if let Some(physical) = world.get_physical_mut(flower) {
        physical.ax = dir_x * speed;
        physical.ay = dir_y * speed;
    }
}

fn handle_petal_switch(world: &mut World, client: &ServerClient, r: &mut PacketReader) {
    let Some(player_info_entity) = client.player_info else { return };
    let Ok(slot_index) = r.read_u8("petal_switch.slot") else { return };
    let Ok(secondary) = r.read_bool("petal_switch.secondary") else { return };
    let Ok(id_byte) = r.read_u8("petal_switch.id") else { return };
    let Ok(rarity_byte) = r.read_u8("petal_switch.rarity") else { return };
    let Some(id) = PetalId::from_u8(id_byte) else { return };
    let Some(rarity) = Rarity::from_u8(rarity_byte) else { return };

    let Some(info) = world.get_player_info_mut(player_info_entity) else { return };
    let slots = if secondary { &mut info.secondary_slots } else { &mut info.slots };
    if let Some(slot) = slots.get_mut(slot_index as usize) {
        slot.id = id;
        slot.rarity = rarity;
        slot.cooldown_ticks = 0;
        slot.petals = [Entity::NULL; MAX_PETALS_PER_SLOT];
    }
}

fn send_squad_fail(client: &mut ServerClient, reason: SquadFailReason) {
    let mut w = PacketWriter::new();
    w.write_u8(ClientboundHeader::SquadFail as u8);
    w.write_u8(reason as u8);
    client.queue_message(w.into_vec());
}

/// `squad_join`'s `mode` byte: 2 creates a room (S3's "type=2"), 1 joins
/// one by `<server_alias>-<code>` (S3's "type=1").
fn handle_squad_join(world: &mut World, config: &ServerConfig, client: &mut ServerClient, r: &mut PacketReader) {
    let Some(player_info_entity) = client.player_info else { return };
    let Ok(mode) = r.read_u8("squad_join.mode") else { return };

    let result: Result<(), SquadFailReason> = match mode {
        2 => {
            let Ok(biome) = r.read_u8("squad_join.biome") else { return };
            squad::create(world, player_info_entity, biome).map(|_| ())
        }
        1 => {
            let Ok(code) = r.read_str(100, "squad_join.code") else { return };
            match squad::find_by_code(world.for_each_squad(), &config.server_alias, &code) {
                Some(squad_entity) => squad::join(world, squad_entity, player_info_entity).map(|_| ()),
                None => Err(SquadFailReason::InvalidSquad),
            }
        }
        _ => Err(SquadFailReason::InvalidSquad),
    };
    if let Err(reason) = result {
        send_squad_fail(client, reason);
    }
}

/// S1: "on `squad_ready`, spawns a PlayerInfo at spawn-zone (1,1)" -- the
/// `PlayerInfo` already exists from login; this spawns the avatar bundle
/// (`Flower`/`Physical`/`Health`/`Relations`) it was still missing,
/// grounded in `original_source/Server/Client.c`'s
/// `rr_server_client_create_flower`.
fn handle_squad_ready(world: &mut World, client: &ServerClient, default_arena: Entity) {
    let Some(player_info_entity) = client.player_info else { return };
    let already_has_flower = world.get_player_info(player_info_entity).map(|i| !i.flower.is_null()).unwrap_or(true);
    if already_has_flower {
        return;
    }
    let Some(arena) = world.get_arena(default_arena) else { return };
    let (spawn_x, spawn_y) = arena.respawn_zone;

    let Ok(flower_entity) = world.alloc_entity() else { return };
    let _ = world.add_physical(flower_entity, Physical { x: spawn_x, y: spawn_y, arena: default_arena, ..Default::default() });
    let _ = world.add_health(flower_entity, Health::default());
    let _ = world.add_flower(flower_entity, Flower::default());
    let _ = world.add_relations(flower_entity, Relations { team: Team::Players, owner: flower_entity, root_owner: flower_entity, ..Default::default() });

    if let Some(info) = world.get_player_info_mut(player_info_entity) {
        info.flower = flower_entity;
        info.arena = default_arena;
        info.camera_x = spawn_x;
        info.camera_y = spawn_y;
    }
}

fn owner_slot_of(world: &World, client: &ServerClient) -> Option<(Entity, usize)> {
    let player_info_entity = client.player_info?;
    let info = world.get_player_info(player_info_entity)?;
    let squad_entity = info.squad?;
    Some((squad_entity, info.squad_pos as usize))
}

fn handle_squad_update(world: &mut World, client: &ServerClient, r: &mut PacketReader) {
    let Ok(private) = r.read_bool("squad_update.private") else { return };
    let Ok(expose_code) = r.read_bool("squad_update.expose_code") else { return };
    let Some((squad_entity, my_slot)) = owner_slot_of(world, client) else { return };
    if let Some(squad) = world.get_squad_mut(squad_entity) {
        if squad.owner_slot == my_slot {
            squad.private = private;
            squad.expose_code = expose_code;
        }
    }
}

fn handle_private_update(world: &mut World, client: &ServerClient, r: &mut PacketReader) {
    let Ok(private) = r.read_bool("private_update.private") else { return };
    let Some((squad_entity, my_slot)) = owner_slot_of(world, client) else { return };
    if let Some(squad) = world.get_squad_mut(squad_entity) {
        if squad.owner_slot == my_slot {
            squad.private = private;
        }
    }
}

fn handle_expose_code_update(world: &mut World, client: &ServerClient, r: &mut PacketReader) {
    let Ok(expose_code) = r.read_bool("expose_code_update.expose_code") else { return };
    let Some((squad_entity, my_slot)) = owner_slot_of(world, client) else { return };
    if let Some(squad) = world.get_squad_mut(squad_entity) {
        if squad.owner_slot == my_slot {
            squad.expose_code = expose_code;
        }
    }
}

fn handle_squad_kick(world: &mut World, config: &ServerConfig, client: &ServerClient, r: &mut PacketReader) {
    let Ok(target_slot) = r.read_u8("squad_kick.target_slot") else { return };
    let Some((squad_entity, my_slot)) = owner_slot_of(world, client) else { return };
    squad::kick(world, squad_entity, my_slot, target_slot as usize, config.sandbox);
}

fn handle_transfer_ownership(world: &mut World, client: &ServerClient, r: &mut PacketReader) {
    let Ok(new_owner_slot) = r.read_u8("squad_transfer_ownership.new_owner_slot") else { return };
    let Some((squad_entity, my_slot)) = owner_slot_of(world, client) else { return };
    squad::transfer_ownership(world, squad_entity, my_slot, new_owner_slot as usize);
}

/// S2's craft scenario: `id==basic` always succeeds; everything else rolls
/// the PRD model per-attempt against the account's running failure streak
/// for that `(id, rarity)` pair.
fn handle_petals_craft(client: &mut ServerClient, r: &mut PacketReader) {
    let Ok(id_byte) = r.read_u8("petals_craft.id") else { return };
    let Ok(rarity_byte) = r.read_u8("petals_craft.rarity") else { return };
    let Ok(count) = r.read_varuint("petals_craft.count") else { return };
    if count == 0 {
        return;
    }
    let Some(entry) = client.account.inventory.iter_mut().find(|e| e.id == id_byte && e.rarity == rarity_byte) else { return };
    if (entry.count as u64) < count {
        return;
    }
    entry.count -= count as u32;

    let base_c = prd::prd_base(balance::CRAFT_NOMINAL_RATE);
    let state = client.account.craft_fails.entry((id_byte, rarity_byte)).or_default();
    let always_succeeds = id_byte == PetalId::Basic as u8;
    let mut successes = 0u32;
    for _ in 0..count {
        if always_succeeds || state.roll(base_c, fastrand::f64()) {
            successes += 1;
        }
    }
    let fails = count as u32 - successes;

    if successes > 0 {
        if let Some(next_rarity) = Rarity::from_u8(rarity_byte).and_then(Rarity::next) {
            let next_rarity = next_rarity as u8;
            let existing_slot = client.account.inventory.iter().position(|e| e.id == id_byte && e.rarity == next_rarity);
            match existing_slot {
                Some(i) => client.account.inventory[i].count += successes,
                None => client.account.inventory.push(crate::account::InventoryEntry { id: id_byte, rarity: next_rarity, count: successes }),
            }
        }
    }

    let xp = successes as f64 * balance::CRAFT_XP_GAINS[0];
    client.account.experience += xp;

    let mut w = PacketWriter::new();
    w.write_u8(ClientboundHeader::CraftResult as u8);
    w.write_varuint(successes as u64);
    w.write_varuint(fails as u64);
    w.write_varuint(0);
    w.write_f64(xp);
    client.queue_message(w.into_vec());
}

/// Chat history/moderation depth is a Non-goal; this only records the
/// client's latest message on its own session, per the review's
/// instruction to route it into `ServerClient`'s fields.
fn handle_chat(client: &mut ServerClient, r: &mut PacketReader) {
    let Ok(message) = r.read_str(300, "chat.message") else { return };
    client.last_chat_message = Some(message);
}

fn handle_chat_block(world: &mut World, client: &ServerClient, r: &mut PacketReader) {
    let Ok(target_slot) = r.read_u8("chat_block.target_slot") else { return };
    let Some((squad_entity, _my_slot)) = owner_slot_of(world, client) else { return };
    if let Some(squad) = world.get_squad_mut(squad_entity) {
        if let Some(member) = squad.members.get_mut(target_slot as usize) {
            member.blocked = true;
        }
    }
}

fn handle_dev_cheat(client: &mut ServerClient, r: &mut PacketReader) {
    if !client.is_dev {
        return;
    }
    let Ok(flags_byte) = r.read_u8("dev_cheat.flags") else { return };
    let Ok(speed_percent) = r.read_f32("dev_cheat.speed_percent") else { return };
    let Ok(fov_percent) = r.read_f32("dev_cheat.fov_percent") else { return };
    client.dev_cheats.flags = crate::session::client::DevCheatFlags::from_bits_truncate(flags_byte);
    client.dev_cheats.speed_percent = speed_percent;
    client.dev_cheats.fov_percent = fov_percent;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Arena;

    #[test]
    fn login_with_wrong_echo_is_rejected() {
        let mut world = World::new();
        let mut client = ServerClient::new(1, 1, 2);
        client.requested_verification = 42;
        let mut w = PacketWriter::new();
        w.write_u64(1);
        w.write_u64(999);
        w.write_str("", 300);
        w.write_str("uuid", 100);
        w.write_varuint(0);
        handle_login(&mut world, &mut client, &w.into_vec());
        assert!(!client.received_first_packet);
        assert!(client.pending_kick);
    }

    #[test]
    fn login_with_correct_echo_allocates_player_info() {
        let mut world = World::new();
        let mut client = ServerClient::new(1, 1, 2);
        client.requested_verification = 42;
        let mut w = PacketWriter::new();
        w.write_u64(1);
        w.write_u64(42);
        w.write_str("", 300);
        w.write_str("player-uuid", 100);
        w.write_varuint(0);
        handle_login(&mut world, &mut client, &w.into_vec());
        assert!(client.received_first_packet);
        assert!(client.player_info.is_some());
        assert_eq!(client.uuid, "player-uuid");
    }

    #[test]
    fn squad_ready_spawns_a_flower_at_the_arena_respawn_zone() {
        let mut world = World::new();
        let arena_entity = world.alloc_entity().unwrap();
        world.add_arena(arena_entity, Arena::new(0, 8, 100.0)).unwrap();
        let player_info_entity = world.alloc_entity().unwrap();
        world.add_player_info(player_info_entity, PlayerInfo::default()).unwrap();

        let mut client = ServerClient::new(1, 1, 2);
        client.player_info = Some(player_info_entity);

        handle_squad_ready(&mut world, &client, arena_entity);

        let info = world.get_player_info(player_info_entity).unwrap();
        assert!(!info.flower.is_null());
        let physical = world.get_physical(info.flower).unwrap();
        assert_eq!((physical.x, physical.y), (100.0, 100.0));
    }

    #[test]
    fn craft_of_basic_petal_always_succeeds() {
        let mut client = ServerClient::new(1, 1, 2);
        client.account.inventory.push(crate::account::InventoryEntry { id: PetalId::Basic as u8, rarity: Rarity::Common as u8, count: 5 });

        let mut w = PacketWriter::new();
        w.write_u8(PetalId::Basic as u8);
        w.write_u8(Rarity::Common as u8);
        w.write_varuint(5);
        let bytes = w.into_vec();
        let mut r = PacketReader::new(&bytes);
        handle_petals_craft(&mut client, &mut r);

        let upgraded = client.account.inventory.iter().find(|e| e.rarity == Rarity::Unusual as u8).unwrap();
        assert_eq!(upgraded.count, 5);
        assert_eq!(client.account.experience, 5.0);
    }
}
