pub mod grid;

pub use grid::{Bounds, SpatialHash, CELL_SIZE};
