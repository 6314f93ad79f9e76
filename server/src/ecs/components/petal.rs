use crate::ecs::entity::Entity;
use rysteria_protocol::ids::{PetalId, Rarity};

/// An orbiting/launched petal (§3 Petal, §4.5).
#[derive(Debug, Clone, Copy)]
pub struct Petal {
    pub id: PetalId,
    pub rarity: Rarity,
    pub detached: bool,
    pub effect_delay_ticks: u32,
    pub spin_direction: f32,
    /// Seed petals bind to a dead ally flower to revive it.
    pub bind_target: Option<Entity>,
    pub bind_offset: (f32, f32),
    pub slot: Option<PetalSlotRef>,
    /// Meat petals aggro up to `10 + rarity` mobs.
    pub aggro_count: u32,
}

/// Back-pointer to the owning flower's slot array (§3 invariant: a Petal has
/// at most one slot back-pointer).
#[derive(Debug, Clone, Copy)]
pub struct PetalSlotRef {
    pub flower: Entity,
    pub slot_index: usize,
    pub petal_index: usize,
    pub secondary: bool,
}

impl Petal {
    pub fn new(id: PetalId, rarity: Rarity) -> Self {
        Self {
            id,
            rarity,
            detached: false,
            effect_delay_ticks: 0,
            spin_direction: 1.0,
            bind_target: None,
            bind_offset: (0.0, 0.0),
            slot: None,
            aggro_count: 0,
        }
    }
}
