use crate::ecs::entity::Entity;

/// Links a centipede segment to its neighbors (§3 Centipede).
#[derive(Debug, Clone, Copy, Default)]
pub struct Centipede {
    pub parent_node: Option<Entity>,
    pub child_node: Option<Entity>,
}
