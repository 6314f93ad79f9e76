//! §5 order step "camera": recomputes each client's `entities_in_view`
//! set (§4.7 "View filtering") from its camera/FOV, ready for the next
//! delta snapshot.

use crate::ecs::entity::Entity;
use crate::ecs::store::World;

const VIEW_MARGIN: f32 = 200.0;
const FOV_EASE: f32 = 0.08;

pub fn tick(world: &mut World) {
    let flowers: Vec<Entity> = world.for_each_player_info().map(|(e, _)| e).collect();
    for client in flowers {
        update_one(world, client);
    }
}

fn update_one(world: &mut World, client: Entity) {
    let Some(info) = world.get_player_info(client) else { return };
    let Some(physical) = world.get_physical(info.flower).copied() else { return };

    let fov_min = info.modifiers.fov_min.max(0.2);
    let target_fov = info.camera_target_fov.max(fov_min);
    let eased_fov = info.camera_fov + (target_fov - info.camera_fov) * FOV_EASE;

    let half_w = 960.0 / eased_fov + VIEW_MARGIN;
    let half_h = 540.0 / eased_fov + VIEW_MARGIN;

    let visible: std::collections::HashSet<Entity> = {
        let arena = physical.arena;
        let mut out = std::collections::HashSet::new();
        if let Some(a) = world.get_arena_mut(arena) {
            a.spatial_hash
                .query_rect(physical.x, physical.y, half_w * 2.0, half_h * 2.0, |e| {
                    out.insert(e);
                });
        }
        out
    };

    if let Some(info) = world.get_player_info_mut(client) {
        info.camera_x = physical.x;
        info.camera_y = physical.y;
        info.camera_fov = eased_fov;
        info.entities_in_view = visible;
    }
}
