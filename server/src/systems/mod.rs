//! The fixed per-tick system order (§5): collision-detection, AI, drops,
//! petal-behavior, collision-resolution, web, velocity, centipede, health,
//! camera, spawn, delete-sweep. AI and petal-behavior both react to the
//! same broad-phase pairs collision-detection produced this tick, before
//! collision-resolution is allowed to move anything.

pub mod ai;
pub mod camera;
pub mod centipede;
pub mod collision;
pub mod delete_sweep;
pub mod drops;
pub mod health;
pub mod petal_behavior;
pub mod spawn;
pub mod velocity;
pub mod web;

use crate::ecs::store::World;

pub fn tick(world: &mut World, tick_num: u64) {
    let pairs = collision::detect(world);
    ai::tick(world);
    drops::tick(world);
    petal_behavior::tick(world, tick_num);
    collision::resolve(world, &pairs, tick_num);
    web::tick(world);
    velocity::tick(world);
    centipede::tick(world);
    health::tick(world);
    camera::tick(world);
    spawn::tick(world);
    delete_sweep::tick(world);
}
