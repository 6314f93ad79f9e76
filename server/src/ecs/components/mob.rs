use crate::ecs::entity::Entity;
use rysteria_protocol::ids::{MobId, Rarity};

/// Non-player combatant metadata (§3 Mob).
#[derive(Debug, Clone, Copy)]
pub struct Mob {
    pub id: MobId,
    pub rarity: Rarity,
    pub player_spawned: bool,
    pub no_drop: bool,
    pub ai_zone: Option<Entity>,
    pub ticks_until_despawn: u32,
}

impl Mob {
    pub fn new(id: MobId, rarity: Rarity) -> Self {
        Self {
            id,
            rarity,
            player_spawned: false,
            no_drop: false,
            ai_zone: None,
            ticks_until_despawn: 0,
        }
    }
}
