//! Static balance data.
//!
//! §1 Non-goals: the real `RR_PETAL_DATA`/`RR_MOB_DATA`/maze templates are
//! out of scope — "configuration data the core consumes". This module is
//! the interface the rest of the crate programs against; it ships a small
//! representative table rather than the full production dataset so the
//! spawner, AI and petal systems have something concrete to run over.

use rysteria_protocol::ids::{MobId, PetalId, Rarity};

#[derive(Clone, Copy)]
pub struct MobStats {
    pub id: MobId,
    pub radius: f32,
    pub difficulty_weight: f32,
    pub base_health: f32,
    pub damage: f32,
}

/// Per-biome mob weight table: `(mob, relative weight)`. Weights are
/// relative within a biome, not absolute probabilities.
pub struct BiomeTable {
    pub entries: &'static [(MobId, f32)],
}

pub const GARDEN: BiomeTable = BiomeTable {
    entries: &[
        (MobId::Ladybug, 3.0),
        (MobId::Bee, 2.0),
        (MobId::Spider, 1.0),
        (MobId::Beetle, 1.0),
        (MobId::Fern, 0.6),
    ],
};

pub const DESERT: BiomeTable = BiomeTable {
    entries: &[
        (MobId::Centipede, 2.0),
        (MobId::CentipedeSegment, 0.0),
        (MobId::HornetSapphire, 1.2),
        (MobId::Pteranodon, 1.0),
    ],
};

pub fn biome_table(biome: u8) -> &'static BiomeTable {
    match biome {
        1 => &DESERT,
        _ => &GARDEN,
    }
}

pub fn mob_stats(id: MobId) -> MobStats {
    let (radius, weight, health, damage) = match id {
        MobId::Ladybug => (20.0, 1.0, 12.0, 4.0),
        MobId::Bee => (18.0, 1.3, 10.0, 6.0),
        MobId::Spider => (22.0, 1.6, 16.0, 5.0),
        MobId::HornetSapphire => (20.0, 1.8, 14.0, 9.0),
        MobId::Centipede => (16.0, 2.0, 8.0, 4.0),
        MobId::CentipedeSegment => (14.0, 0.0, 6.0, 3.0),
        MobId::Beetle => (30.0, 1.2, 24.0, 5.0),
        MobId::Fern => (24.0, 0.6, 18.0, 3.0),
        MobId::Pteranodon => (26.0, 2.2, 20.0, 10.0),
        MobId::Meteor => (40.0, 0.0, 80.0, 15.0),
        MobId::Ornithomimus => (28.0, 2.4, 26.0, 11.0),
        MobId::Pachycephalosaurus => (30.0, 2.6, 34.0, 13.0),
        MobId::Dakotaraptor => (28.0, 2.8, 30.0, 14.0),
        MobId::Triceratops => (36.0, 3.2, 60.0, 16.0),
        MobId::GoldenMeteor => (40.0, 0.0, 80.0, 18.0),
        MobId::TRex => (60.0, 4.0, 250.0, 25.0),
    };
    MobStats { id, radius, difficulty_weight: weight, base_health: health, damage }
}

/// Rolling cumulative rarity table seeded by difficulty (§4.3 step 4).
/// Higher `difficulty` shifts weight toward rarer tiers.
pub fn roll_rarity(difficulty: f32) -> Rarity {
    let boost = difficulty.max(0.0);
    let weights = [
        (Rarity::Common, 60.0),
        (Rarity::Unusual, 25.0 + boost * 2.0),
        (Rarity::Rare, 10.0 + boost * 3.0),
        (Rarity::Epic, 4.0 + boost * 2.0),
        (Rarity::Legendary, 1.0 + boost),
    ];
    let total: f32 = weights.iter().map(|(_, w)| w).sum();
    let mut roll = fastrand::f32() * total;
    for (rarity, w) in weights {
        if roll < w {
            return rarity;
        }
        roll -= w;
    }
    Rarity::Common
}

pub fn pick_mob(table: &BiomeTable) -> MobId {
    let total: f32 = table.entries.iter().map(|(_, w)| w).sum();
    let mut roll = fastrand::f32() * total;
    for &(id, w) in table.entries {
        if roll < w {
            return id;
        }
        roll -= w;
    }
    table.entries[0].0
}

pub struct PetalStats {
    pub id: PetalId,
    pub cooldown_ticks: u32,
    pub radius: f32,
}

pub fn petal_stats(id: PetalId) -> PetalStats {
    PetalStats { id, cooldown_ticks: 25, radius: 6.0 }
}

/// Units/tick a flower accelerates toward under full analog input, before
/// the dev `speed_percent` multiplier (§4.7 `input`). `original_source/`
/// uses this value (`RR_PLAYER_SPEED`) at several call sites but the
/// constant's own definition lives in a header the prep cap filtered out,
/// so this is this port's own assumed figure.
pub const PLAYER_SPEED: f32 = 4.0;

/// Nominal long-run craft success rate the PRD model is built from (§GLOSSARY
/// PRD). Not present in the retained source either; chosen as a plausible
/// rare-upgrade rate.
pub const CRAFT_NOMINAL_RATE: f64 = 0.1;

/// XP granted per successful craft, indexed by the destination rarity tier
/// (S2 references `CRAFT_XP_GAINS[0]`). The full table wasn't retained in
/// `original_source/`; only the first tier is needed by any tested scenario.
pub const CRAFT_XP_GAINS: [f64; 1] = [1.0];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_difficulty_shifts_toward_rarer_tiers() {
        let mut common_low = 0;
        let mut common_high = 0;
        fastrand::seed(1);
        for _ in 0..2000 {
            if roll_rarity(0.0) == Rarity::Common {
                common_low += 1;
            }
            if roll_rarity(20.0) == Rarity::Common {
                common_high += 1;
            }
        }
        assert!(common_high < common_low);
    }
}
