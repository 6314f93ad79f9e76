//! Integrates acceleration and friction into position (§4.6: "Knockback...
//! scaled by `knockback_scale`, which decays to 1 with stun").

use crate::ecs::store::World;

pub fn tick(world: &mut World) {
    for (_, physical) in world.for_each_physical_mut() {
        physical.vx = (physical.vx + physical.ax) * physical.friction;
        physical.vy = (physical.vy + physical.ay) * physical.friction;
        physical.x += physical.vx;
        physical.y += physical.vy;
        physical.ax = 0.0;
        physical.ay = 0.0;
        physical.angle += physical.angular_velocity;

        if physical.stun_ticks > 0 {
            physical.stun_ticks -= 1;
        } else {
            physical.knockback_scale += (1.0 - physical.knockback_scale) * 0.1;
        }
    }
}
