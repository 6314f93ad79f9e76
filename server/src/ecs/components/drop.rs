use rysteria_protocol::ids::{PetalId, Rarity};

/// A loot pickup on the ground (§3 Drop).
#[derive(Debug, Clone, Copy)]
pub struct Drop {
    pub id: PetalId,
    pub rarity: Rarity,
    pub ticks_until_despawn: u32,
    /// Bit `i` set means squad slot `i` is allowed to pick this up (§3.6
    /// damage-credit loot gating).
    pub pickable_by_squad: u8,
}

impl Drop {
    pub fn new(id: PetalId, rarity: Rarity, pickable_by_squad: u8) -> Self {
        Self {
            id,
            rarity,
            ticks_until_despawn: 25 * 60,
            pickable_by_squad,
        }
    }

    pub fn is_pickable_by(&self, squad_slot: usize) -> bool {
        self.pickable_by_squad & (1 << squad_slot) != 0
    }
}
