use crate::ecs::entity::Entity;
use rysteria_protocol::ids::{AiKind, AiState};

/// Per-mob AI state machine (§4.4).
#[derive(Debug, Clone, Copy)]
pub struct Ai {
    pub kind: AiKind,
    pub state: AiState,
    pub target: Option<Entity>,
    pub ticks_until_next_action: u32,
    pub aggro_range: f32,
}

impl Default for Ai {
    fn default() -> Self {
        Self {
            kind: AiKind::Neutral,
            state: AiState::Idle,
            target: None,
            ticks_until_next_action: fastrand::u32(25..=75),
            aggro_range: 600.0,
        }
    }
}
