use crate::ecs::entity::Entity;

bitflags::bitflags! {
    /// Flags packed onto `Physical` (§3).
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct PhysicalFlags: u8 {
        const ON_TITLE_SCREEN  = 0b0000_0001;
        const BUBBLING         = 0b0000_0010;
        const BUBBLING_TO_DEATH = 0b0000_0100;
        /// Dev-cheat escape hatches named in §9 Design Notes.
        const NO_WALL_COLLISION = 0b0000_1000;
        const NO_AGGRO          = 0b0001_0000;
        const INVISIBLE         = 0b0010_0000;
    }
}

/// Position, motion and contact geometry (§3 Physical).
#[derive(Debug, Clone, Copy)]
pub struct Physical {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub ax: f32,
    pub ay: f32,
    pub radius: f32,
    pub angle: f32,
    pub angular_velocity: f32,
    pub friction: f32,
    pub mass: f32,
    pub arena: Entity,
    pub stun_ticks: u32,
    pub knockback_scale: f32,
    pub deletion_anim_phase: f32,
    pub flags: PhysicalFlags,
}

impl Default for Physical {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            ax: 0.0,
            ay: 0.0,
            radius: 10.0,
            angle: 0.0,
            angular_velocity: 0.0,
            friction: 0.84,
            mass: 1.0,
            arena: Entity::NULL,
            stun_ticks: 0,
            knockback_scale: 1.0,
            deletion_anim_phase: 0.0,
            flags: PhysicalFlags::empty(),
        }
    }
}

impl Physical {
    pub fn is_deleting(&self) -> bool {
        self.deletion_anim_phase > 0.0
    }
}
