use rysteria_protocol::ids::Rarity;

/// Spawned by the `nest` petal's defend effect (§4.5); rotates bound seed
/// petals around itself.
#[derive(Debug, Clone, Copy)]
pub struct Nest {
    pub rarity: Rarity,
    pub global_rotation: f32,
    pub rotation_count: u32,
    pub rotation_pos: u32,
}

impl Nest {
    pub fn new(rarity: Rarity) -> Self {
        Self {
            rarity,
            global_rotation: 0.0,
            rotation_count: 0,
            rotation_pos: 0,
        }
    }
}
