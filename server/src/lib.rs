//! Authoritative simulation for Rysteria arenas: ECS world, fixed-order
//! tick systems, spatial indexing, maze/mob spawn pacing, squad rooms,
//! client sessions and the account sidecar.

pub mod account;
pub mod balance;
pub mod config;
pub mod ecs;
pub mod error;
pub mod maze;
pub mod session;
pub mod spatial;
pub mod squad;
pub mod systems;
pub mod tick;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
