use crate::ecs::entity::Entity;
use crate::maze::cell::MazeCell;
use crate::spatial::grid::SpatialHash;

/// A single arena/maze instance (§3 Arena).
pub struct Arena {
    pub biome: u8,
    pub grid_dim: u32,
    pub grid_size: f32,
    pub cells: Vec<MazeCell>,
    pub spatial_hash: SpatialHash,
    pub respawn_zone: (f32, f32),
    pub mob_count: u32,
    pub player_entered: bool,
    pub first_squad_to_enter: Option<Entity>,
    pub pvp: bool,
}

impl Arena {
    pub fn new(biome: u8, grid_dim: u32, grid_size: f32) -> Self {
        let cell_count = (grid_dim * grid_dim) as usize;
        Self {
            biome,
            grid_dim,
            grid_size,
            cells: vec![MazeCell::default(); cell_count],
            spatial_hash: SpatialHash::new(256.0),
            respawn_zone: (grid_size, grid_size),
            mob_count: 0,
            player_entered: false,
            first_squad_to_enter: None,
            pvp: false,
        }
    }

    pub fn cell_index(&self, cx: i32, cy: i32) -> Option<usize> {
        if cx < 0 || cy < 0 || cx as u32 >= self.grid_dim || cy as u32 >= self.grid_dim {
            return None;
        }
        Some(cy as usize * self.grid_dim as usize + cx as usize)
    }

    pub fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        ((x / self.grid_size) as i32, (y / self.grid_size) as i32)
    }

    pub fn cell_at(&self, x: f32, y: f32) -> Option<&MazeCell> {
        let (cx, cy) = self.world_to_cell(x, y);
        self.cell_index(cx, cy).map(|i| &self.cells[i])
    }
}
