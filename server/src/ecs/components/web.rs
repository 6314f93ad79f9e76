/// A slow-field left by a landed web petal (§4.5, §4.6).
#[derive(Debug, Clone, Copy)]
pub struct Web {
    pub radius: f32,
    pub ticks_until_despawn: u32,
}

impl Web {
    /// `slow = 1 - 0.56^rarity`; flowers take 80% of the slowdown (§4.6).
    pub fn slow_factor(rarity_scale: u32, is_flower: bool) -> f32 {
        let slow = 1.0 - 0.56f32.powi(rarity_scale as i32);
        let applied = if is_flower { slow * 0.8 } else { slow };
        1.0 - applied
    }
}
