use crate::ecs::entity::Entity;
use rysteria_protocol::ids::{PetalId, Rarity};

pub const MAX_SLOTS: usize = 10;
pub const MAX_PETALS_PER_SLOT: usize = 4;

bitflags::bitflags! {
    /// Input flags carried on every `input` packet (§4.7, §4.5 radius
    /// selection: bit 0 = attacking/extend, bit 1 = defending/retract).
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct InputFlags: u8 {
        const ATTACKING = 0b0000_0001;
        const DEFENDING = 0b0000_0010;
        const MOVE_UP    = 0b0000_0100;
        const MOVE_DOWN  = 0b0000_1000;
        const MOVE_LEFT  = 0b0001_0000;
        const MOVE_RIGHT = 0b0010_0000;
        /// Set when the payload carries analog mouse-relative movement
        /// instead of the `MOVE_*` direction bits (`original_source`'s
        /// `movementFlags & 0x40` switch).
        const MOUSE_MODE = 0b0100_0000;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PetalInstanceSlot {
    pub id: PetalId,
    pub rarity: Rarity,
    pub petals: [Entity; MAX_PETALS_PER_SLOT],
    pub cooldown_ticks: u32,
}

impl Default for PetalInstanceSlot {
    fn default() -> Self {
        Self {
            id: PetalId::Basic,
            rarity: Rarity::Common,
            petals: [Entity::NULL; MAX_PETALS_PER_SLOT],
            cooldown_ticks: 0,
        }
    }
}

/// Aggregate stat modifiers recomputed each tick from equipped petals
/// (§4.5 step 1).
#[derive(Debug, Clone, Copy)]
pub struct Modifiers {
    pub pickup_radius: f32,
    pub petal_extension: f32,
    pub reload_speed: f32,
    pub speed_factor: f32,
    pub fov_min: f32,
    pub damage_reduction_ratio: f32,
    pub rotation_rate: f32,
    pub reverse_rotation: bool,
    pub heal_per_tick: f32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            pickup_radius: 0.0,
            petal_extension: 0.0,
            reload_speed: 1.0,
            speed_factor: 1.0,
            fov_min: 0.0,
            damage_reduction_ratio: 0.0,
            rotation_rate: 0.04,
            reverse_rotation: false,
            heal_per_tick: 0.0,
        }
    }
}

/// Per-client simulation state (§3 PlayerInfo).
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub client: Option<u32>,
    pub squad: Option<Entity>,
    pub squad_pos: u8,
    pub slot_count: usize,
    pub slots: [PetalInstanceSlot; MAX_SLOTS],
    pub secondary_slots: [PetalInstanceSlot; MAX_SLOTS],
    pub camera_x: f32,
    pub camera_y: f32,
    pub camera_fov: f32,
    pub camera_target_fov: f32,
    pub input: InputFlags,
    pub mouse_x: f32,
    pub mouse_y: f32,
    pub arena: Entity,
    pub drops_this_tick: Vec<Entity>,
    pub rotation_counter: f32,
    pub spectate_target: Option<Entity>,
    pub entities_in_view: std::collections::HashSet<Entity>,
    pub modifiers: Modifiers,
    pub flower: Entity,
    /// Tracks real-time idle for the AFK kick rule (§5 cancellation).
    pub last_input_change_tick: u64,
    pub last_input_snapshot: (InputFlags, i32, i32),
}

impl Default for PlayerInfo {
    fn default() -> Self {
        Self {
            client: None,
            squad: None,
            squad_pos: 0,
            slot_count: 5,
            slots: [PetalInstanceSlot::default(); MAX_SLOTS],
            secondary_slots: [PetalInstanceSlot::default(); MAX_SLOTS],
            camera_x: 0.0,
            camera_y: 0.0,
            camera_fov: 1.0,
            camera_target_fov: 1.0,
            input: InputFlags::empty(),
            mouse_x: 0.0,
            mouse_y: 0.0,
            arena: Entity::NULL,
            drops_this_tick: Vec::new(),
            rotation_counter: 0.0,
            spectate_target: None,
            entities_in_view: std::collections::HashSet::new(),
            modifiers: Modifiers::default(),
            flower: Entity::NULL,
            last_input_change_tick: 0,
            last_input_snapshot: (InputFlags::empty(), 0, 0),
        }
    }
}

impl PlayerInfo {
    /// Seconds of real time, at the 25 Hz tick rate, before AFK kicks in
    /// (§5: 10 real minutes; §8 S4).
    pub const AFK_TICKS: u64 = 10 * 60 * 25;

    /// Updates the idle tracker; returns true if the player is now AFK.
    pub fn note_input_and_check_afk(&mut self, tick: u64, mouse_x: i32, mouse_y: i32) -> bool {
        let snapshot = (self.input, mouse_x, mouse_y);
        if snapshot != self.last_input_snapshot {
            self.last_input_snapshot = snapshot;
            self.last_input_change_tick = tick;
            return false;
        }
        tick.saturating_sub(self.last_input_change_tick) >= Self::AFK_TICKS
    }
}
