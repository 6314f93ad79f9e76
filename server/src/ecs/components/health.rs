/// HP, damage, and per-squad damage crediting (§3 Health).
///
/// `squad_damage` indices are squad slots 0..4; Testable Property 3 ties
/// their sum to `max_health - health + gradually_healed`.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub damage_reduction: f32,
    pub damage_reduction_ratio: f32,
    pub last_damaged_tick: u64,
    pub squad_damage: [f32; 4],
    pub gradually_healed: f32,
    pub animation_phase: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            health: 100.0,
            max_health: 100.0,
            damage: 0.0,
            damage_reduction: 0.0,
            damage_reduction_ratio: 0.0,
            last_damaged_tick: 0,
            squad_damage: [0.0; 4],
            gradually_healed: 0.0,
            animation_phase: 0.0,
        }
    }
}

impl Health {
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Applies `amount` of raw damage, crediting `squad` (§3 invariant: the
    /// accumulator tracks gross damage dealt by each squad, independent of
    /// damage reduction, which is applied before this call).
    pub fn apply_damage(&mut self, amount: f32, squad: Option<usize>, tick: u64) {
        if amount <= 0.0 {
            return;
        }
        self.health -= amount;
        self.last_damaged_tick = tick;
        if let Some(slot) = squad {
            if slot < self.squad_damage.len() {
                self.squad_damage[slot] += amount;
            }
        }
    }

    pub fn heal(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        let actual = amount.min((self.max_health - self.health).max(0.0));
        self.health = (self.health + actual).min(self.max_health);
        self.gradually_healed += actual;
    }

    /// Total damage credited across all squads, used by §3's death/loot
    /// invariant (squads need >= 20% share to loot).
    pub fn total_squad_damage(&self) -> f32 {
        self.squad_damage.iter().sum()
    }

    /// Squads eligible for loot at death: share >= 20%, or (for arena
    /// bosses) the first squad to enter regardless of share.
    pub fn looting_squads(&self, first_entering_squad: Option<usize>, is_boss: bool) -> Vec<usize> {
        let total = self.total_squad_damage();
        if total <= 0.0 {
            return first_entering_squad.into_iter().collect();
        }
        let mut squads: Vec<usize> = (0..self.squad_damage.len())
            .filter(|&i| self.squad_damage[i] / total >= 0.20)
            .collect();
        if is_boss {
            if let Some(first) = first_entering_squad {
                if !squads.contains(&first) {
                    squads.push(first);
                }
            }
        }
        squads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squad_damage_sum_matches_damage_taken() {
        let mut h = Health::default();
        h.apply_damage(60.0, Some(0), 1);
        h.apply_damage(40.0, Some(1), 2);
        assert_eq!(h.max_health - h.health + h.gradually_healed, h.total_squad_damage());
    }

    #[test]
    fn only_squads_above_twenty_percent_loot() {
        let mut h = Health::default();
        h.apply_damage(60.0, Some(0), 1);
        h.apply_damage(15.0, Some(1), 1);
        h.apply_damage(25.0, Some(2), 1);
        let mut looters = h.looting_squads(None, false);
        looters.sort();
        assert_eq!(looters, vec![0, 2]);
    }
}
