//! A single maze cell (§4.3): walkability, difficulty accumulators, and the
//! per-tick spawn timer. `Arena::cells` is a flat `grid_dim * grid_dim` row of
//! these.

/// Biome-specific override: picks a mob id for a cell instead of the
/// biome's default distribution. Cells inside a `Zone` (§GLOSSARY) carry
/// one of these; most cells carry `None`.
pub type ZoneSpawnFn = fn(cell: &MazeCell) -> Option<rysteria_protocol::ids::MobId>;

#[derive(Clone)]
pub struct MazeCell {
    /// Bit 0 clear or bit 8 set means "wall" (§4.6 collision reads this
    /// directly as `value == 0 || bit 8 set`).
    pub walkability: u16,
    pub base_difficulty: u8,

    /// Reset to 0 at the start of every tick (§4.3 step 1).
    pub player_count: u8,
    pub local_difficulty: f32,

    pub overload: f32,
    pub spawn_timer: f32,
    pub grid_points: f32,

    pub zone_spawner: Option<ZoneSpawnFn>,
}

impl Default for MazeCell {
    fn default() -> Self {
        Self {
            walkability: 1,
            base_difficulty: 1,
            player_count: 0,
            local_difficulty: 0.0,
            overload: 0.0,
            spawn_timer: 0.0,
            grid_points: 0.0,
            zone_spawner: None,
        }
    }
}

/// Player-proximity counter is clamped at 12 (§4.3).
pub const MAX_PLAYER_COUNT: u8 = 12;

impl MazeCell {
    pub fn is_wall(&self) -> bool {
        self.walkability == 0 || (self.walkability & 0x100) != 0
    }

    pub fn bump_player_count(&mut self) {
        if self.player_count < MAX_PLAYER_COUNT {
            self.player_count += 1;
        }
    }

    /// §4.3 step 2: `clamp((flower_level - (base_difficulty-1)*2.1)/10, -1, 1)`.
    pub fn apply_flower_difficulty(&mut self, flower_level: u32) {
        let delta = (flower_level as f32 - (self.base_difficulty as f32 - 1.0) * 2.1) / 10.0;
        self.local_difficulty += delta.clamp(-1.0, 1.0);
    }

    /// §4.3 step 5: decays toward zero when unvisited, clamped to
    /// `[0, 1.5*local_difficulty]`.
    pub fn decay_overload(&mut self, growth: f32) {
        let ceiling = (1.5 * self.local_difficulty).max(0.0);
        if self.player_count == 0 {
            self.overload = (self.overload - 0.02).max(0.0);
        } else {
            self.overload = (self.overload + growth).min(ceiling);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_count_clamps_at_cap() {
        let mut cell = MazeCell::default();
        for _ in 0..20 {
            cell.bump_player_count();
        }
        assert_eq!(cell.player_count, MAX_PLAYER_COUNT);
    }

    #[test]
    fn wall_detection_matches_bit_rules() {
        let mut cell = MazeCell { walkability: 0, ..Default::default() };
        assert!(cell.is_wall());
        cell.walkability = 1;
        assert!(!cell.is_wall());
        cell.walkability = 0x101;
        assert!(cell.is_wall());
    }

    #[test]
    fn overload_decays_to_zero_without_players() {
        let mut cell = MazeCell { overload: 1.0, player_count: 0, ..Default::default() };
        for _ in 0..100 {
            cell.decay_overload(0.05);
        }
        assert_eq!(cell.overload, 0.0);
    }
}
