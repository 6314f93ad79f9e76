//! A single authoritative connection's transport-level state, as opposed
//! to its simulation state (`PlayerInfo`, on the ECS side).
//!
//! Grounded in `examples/original_source/Server/Client.c`
//! (`rr_server_client_init`, `rr_server_client_write_message`) and
//! `Server/Server.c`'s dev-cheat flag bits (lines ~1247-1287).

use std::collections::VecDeque;

use rysteria_protocol::crypto::{RollingKey, RR_SECRET8};
use rysteria_protocol::entity::WireEntity;

use crate::account::AccountRecord;
use crate::ecs::entity::Entity;
use crate::session::snapshot::ViewState;

/// Backpressure threshold: a client whose outbound queue grows past this
/// many unsent messages is disconnected rather than left to balloon
/// (`rr_server_client_write_message`'s `message_length++ >= 512`).
pub const MAX_QUEUED_MESSAGES: usize = 512;

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct DevCheatFlags: u8 {
        const INVISIBLE         = 0b0000_0001;
        const INVULNERABLE      = 0b0000_0010;
        const NO_AGGRO          = 0b0000_0100;
        const NO_WALL_COLLISION = 0b0000_1000;
        const NO_COLLISION      = 0b0001_0000;
        const NO_GRID_INFLUENCE = 0b0010_0000;
    }
}

/// Server-side-only debug toggles a dev account may set (§4.7 `DevCheat`
/// header); never exposed to non-dev accounts.
#[derive(Debug, Clone, Copy)]
pub struct DevCheats {
    pub flags: DevCheatFlags,
    pub speed_percent: f32,
    pub fov_percent: f32,
}

impl Default for DevCheats {
    fn default() -> Self {
        Self { flags: DevCheatFlags::empty(), speed_percent: 1.0, fov_percent: 1.0 }
    }
}

/// One live WebSocket connection, independent of whatever `PlayerInfo`
/// entity it currently drives (a client may be squad-seated but not yet
/// playing).
pub struct ServerClient {
    pub id: u32,
    pub clientbound_key: RollingKey,
    pub serverbound_key: RollingKey,
    pub quick_verification: u8,
    /// Echoed back by the client's first (plaintext) packet to prove it
    /// read the handshake frame (§4.7).
    pub requested_verification: u64,
    pub received_first_packet: bool,
    pub uuid: String,
    pub is_dev: bool,
    pub dev_cheats: DevCheats,
    pub player_info: Option<Entity>,
    /// Live account state this session is editing; populated from the
    /// sidecar's `load_account` message and persisted back out on logout
    /// (§4.8). Empty until the sidecar responds.
    pub account: AccountRecord,
    /// What this client was last told about its view, for `snapshot`'s
    /// delta encoder.
    pub view_state: ViewState,
    pub last_chat_message: Option<String>,
    pub outbound: VecDeque<Vec<u8>>,
    pub pending_kick: bool,
}

impl ServerClient {
    pub fn new(id: u32, clientbound_seed: u64, serverbound_seed: u64) -> Self {
        Self {
            id,
            clientbound_key: RollingKey::new(clientbound_seed),
            serverbound_key: RollingKey::new(serverbound_seed),
            quick_verification: RR_SECRET8,
            requested_verification: 0,
            received_first_packet: false,
            uuid: String::new(),
            is_dev: false,
            dev_cheats: DevCheats::default(),
            player_info: None,
            account: AccountRecord::default(),
            view_state: ViewState::default(),
            last_chat_message: None,
            outbound: VecDeque::new(),
            pending_kick: false,
        }
    }

    /// Enqueues `payload` for send, encrypting it in place unless this is
    /// the first (handshake) frame, and flags the client for disconnect
    /// once its queue backs up past [`MAX_QUEUED_MESSAGES`].
    pub fn queue_message(&mut self, mut payload: Vec<u8>) {
        if self.outbound.len() >= MAX_QUEUED_MESSAGES {
            self.pending_kick = true;
            return;
        }
        if self.received_first_packet {
            self.clientbound_key.advance_then_apply(&mut payload);
        }
        self.outbound.push_back(payload);
    }

    pub fn as_wire_entity(entity: Entity) -> WireEntity {
        WireEntity { index: entity.index() as u16, generation: entity.generation() as u16 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_flags_pending_kick_past_threshold() {
        let mut client = ServerClient::new(1, 1, 2);
        for _ in 0..MAX_QUEUED_MESSAGES {
            client.queue_message(vec![0u8; 4]);
        }
        assert!(!client.pending_kick);
        client.queue_message(vec![0u8; 4]);
        assert!(client.pending_kick);
    }
}
