pub mod cell;
pub mod spawner;

pub use cell::{MazeCell, ZoneSpawnFn};
