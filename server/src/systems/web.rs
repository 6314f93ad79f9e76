//! §5 order step "web": applies landed web-petal slow fields (§4.6, §4.5
//! effect pass) to everything standing in one, and counts their own
//! despawn timer down.

use crate::ecs::entity::Entity;
use crate::ecs::store::World;

pub fn tick(world: &mut World) {
    despawn_expired(world);

    let webs: Vec<(f32, f32, f32)> = world
        .for_each_web()
        .filter_map(|(e, web)| {
            let p = world.get_physical(e)?;
            Some((p.x, p.y, web.radius))
        })
        .collect();
    if webs.is_empty() {
        return;
    }

    let targets: Vec<Entity> = world.for_each_physical().map(|(e, _)| e).collect();
    for e in targets {
        let is_flower = world.has_flower(e);
        let Some(physical) = world.get_physical(e).copied() else { continue };
        for &(wx, wy, radius) in &webs {
            let dx = physical.x - wx;
            let dy = physical.y - wy;
            if dx * dx + dy * dy <= radius * radius {
                let factor = crate::ecs::components::Web::slow_factor(1, is_flower);
                if let Some(p) = world.get_physical_mut(e) {
                    p.vx *= factor;
                    p.vy *= factor;
                }
            }
        }
    }
}

fn despawn_expired(world: &mut World) {
    let expired: Vec<Entity> = world
        .for_each_web_mut()
        .filter_map(|(e, web)| {
            web.ticks_until_despawn = web.ticks_until_despawn.saturating_sub(1);
            (web.ticks_until_despawn == 0).then_some(e)
        })
        .collect();
    for e in expired {
        world.request_deletion(e);
    }
}
