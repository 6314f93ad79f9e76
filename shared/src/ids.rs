//! Identifier enums shared between wire format and simulation.
//!
//! Grounded in `examples/original_source/Shared/Component/Mob.c` and
//! `Shared/StaticData.c`, which enumerate mob/petal/rarity ids as flat
//! `uint8_t`s indexing static tables. The concrete balance tables
//! (`RR_PETAL_DATA`, `RR_MOB_DATA`, maze templates) are out of scope per
//! `spec.md` §1 -- these enums only fix the id space the wire format and the
//! ECS components reference.

/// One of 16 rarity tiers, lowest to highest (§GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rarity {
    Common = 0,
    Unusual = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
    Mythic = 5,
    Ultra = 6,
    Super = 7,
    Exotic = 8,
    Flawless = 9,
    Fantastical = 10,
    Eternal = 11,
    Fabled = 12,
    Abyssal = 13,
    Celestial = 14,
    Omega = 15,
}

pub const RARITY_COUNT: usize = 16;

impl Rarity {
    pub fn from_u8(v: u8) -> Option<Self> {
        use Rarity::*;
        Some(match v {
            0 => Common, 1 => Unusual, 2 => Rare, 3 => Epic,
            4 => Legendary, 5 => Mythic, 6 => Ultra, 7 => Super,
            8 => Exotic, 9 => Flawless, 10 => Fantastical, 11 => Eternal,
            12 => Fabled, 13 => Abyssal, 14 => Celestial, 15 => Omega,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<Self> {
        Rarity::from_u8(self as u8 + 1)
    }
}

/// Team affiliation used by collision and AI rules (§3 Relations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Team {
    Players = 0,
    Mobs = 1,
}

/// AI behavior category, orthogonal to state (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AiKind {
    Passive = 0,
    Neutral = 1,
    Aggro = 2,
}

/// AI state machine states (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AiState {
    Idle = 0,
    Wander = 1,
    Chase = 2,
    Attack = 3,
    Return = 4,
    Bounce = 5,
}

/// A flat mob species id. Only a representative subset needed for tests and
/// AI dispatch is enumerated here; additional ids can be added without
/// breaking wire compatibility since they're carried as a raw `u8` on the
/// wire (see `MobId::Unknown`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MobId {
    Ladybug = 0,
    Bee = 1,
    Spider = 2,
    HornetSapphire = 3,
    Centipede = 4,
    CentipedeSegment = 5,
    Beetle = 6,
    Fern = 7,
    Pteranodon = 8,
    Meteor = 9,
    Ornithomimus = 10,
    Pachycephalosaurus = 11,
    Dakotaraptor = 12,
    Triceratops = 13,
    GoldenMeteor = 14,
    TRex = 15,
}

impl MobId {
    pub fn from_u8(v: u8) -> Option<Self> {
        use MobId::*;
        Some(match v {
            0 => Ladybug, 1 => Bee, 2 => Spider, 3 => HornetSapphire,
            4 => Centipede, 5 => CentipedeSegment, 6 => Beetle, 7 => Fern,
            8 => Pteranodon, 9 => Meteor, 10 => Ornithomimus,
            11 => Pachycephalosaurus, 12 => Dakotaraptor, 13 => Triceratops,
            14 => GoldenMeteor, 15 => TRex,
            _ => return None,
        })
    }
}

/// Petal species id. See §4.5 for the effect each id drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PetalId {
    Basic = 0,
    Leaf = 1,
    Feather = 2,
    Crest = 3,
    ThirdEye = 4,
    Bone = 5,
    Berry = 6,
    Magnet = 7,
    Droplet = 8,
    Shell = 9,
    Peas = 10,
    Azalea = 11,
    Web = 12,
    Meat = 13,
    Nest = 14,
    Seed = 15,
    Gravel = 16,
    Mint = 17,
    Bubble = 18,
    Egg = 19,
    Fireball = 20,
    Meteor = 21,
    Uranium = 22,
}

impl PetalId {
    pub fn from_u8(v: u8) -> Option<Self> {
        use PetalId::*;
        Some(match v {
            0 => Basic, 1 => Leaf, 2 => Feather, 3 => Crest, 4 => ThirdEye,
            5 => Bone, 6 => Berry, 7 => Magnet, 8 => Droplet, 9 => Shell,
            10 => Peas, 11 => Azalea, 12 => Web, 13 => Meat, 14 => Nest,
            15 => Seed, 16 => Gravel, 17 => Mint, 18 => Bubble, 19 => Egg,
            20 => Fireball, 21 => Meteor, 22 => Uranium,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_roundtrips_through_u8() {
        for v in 0..RARITY_COUNT as u8 {
            assert_eq!(Rarity::from_u8(v).unwrap().as_u8(), v);
        }
        assert!(Rarity::from_u8(RARITY_COUNT as u8).is_none());
    }

    #[test]
    fn rarity_next_caps_at_top_tier() {
        assert_eq!(Rarity::Omega.next(), None);
        assert_eq!(Rarity::Common.next(), Some(Rarity::Unusual));
    }
}
