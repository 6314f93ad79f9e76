use crate::ecs::entity::Entity;
use rysteria_protocol::ids::Team;

/// Ownership and team affiliation (§3 Relations).
///
/// `root_owner` is resolved by walking the owner chain to its end each time
/// a petal/mob is created, then cached here -- per §9 Design Notes, a
/// handle that outlives a tick is always re-validated through the store,
/// never trusted blindly.
#[derive(Debug, Clone, Copy)]
pub struct Relations {
    pub team: Team,
    pub owner: Entity,
    pub root_owner: Entity,
    pub nest: Option<Entity>,
}

impl Default for Relations {
    fn default() -> Self {
        Self {
            team: Team::Mobs,
            owner: Entity::NULL,
            root_owner: Entity::NULL,
            nest: None,
        }
    }
}
