//! Uniform-grid broad phase (§4.2).
//!
//! Cell size is a fixed design-time constant (~256 world units, per spec).
//! The grid is fully rebuilt once per tick from the `Physical` store: every
//! entity is inserted into every cell its bounding square overlaps. Queries
//! use a visit-generation counter so a query that spans several cells never
//! reports the same entity twice.

use std::collections::HashMap;

use crate::ecs::entity::Entity;

/// Design-time cell size (§4.2).
pub const CELL_SIZE: f32 = 256.0;

#[derive(Default)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<Entity>>,
    visit_generation: u64,
    last_visited: HashMap<Entity, u64>,
}

pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            visit_generation: 0,
            last_visited: HashMap::new(),
        }
    }

    fn cell_of(&self, x: f32, y: f32) -> (i32, i32) {
        ((x / self.cell_size).floor() as i32, (y / self.cell_size).floor() as i32)
    }

    /// Clears the grid; called once at the start of each tick before
    /// `insert` is called for every live `Physical`.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, e: Entity, bounds: &Bounds) {
        let (min_cx, min_cy) = self.cell_of(bounds.x - bounds.half_w, bounds.y - bounds.half_h);
        let (max_cx, max_cy) = self.cell_of(bounds.x + bounds.half_w, bounds.y + bounds.half_h);
        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                self.cells.entry((cx, cy)).or_default().push(e);
            }
        }
    }

    /// Visits every entity in the cells overlapping `(x,y,w,h)` exactly
    /// once, via the visit-generation counter.
    pub fn query_rect(&mut self, x: f32, y: f32, w: f32, h: f32, mut visitor: impl FnMut(Entity)) {
        self.visit_generation += 1;
        let gen = self.visit_generation;
        let (min_cx, min_cy) = self.cell_of(x - w / 2.0, y - h / 2.0);
        let (max_cx, max_cy) = self.cell_of(x + w / 2.0, y + h / 2.0);
        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    for &e in bucket {
                        let seen = self.last_visited.entry(e).or_insert(0);
                        if *seen != gen {
                            *seen = gen;
                            visitor(e);
                        }
                    }
                }
            }
        }
    }

    /// Nearest entity to `(x,y)` within `radius` passing `filter`; ties
    /// broken by entity index (§4.2).
    pub fn find_nearest(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        mut filter: impl FnMut(Entity) -> bool,
        position_of: impl Fn(Entity) -> Option<(f32, f32)>,
    ) -> Option<Entity> {
        let mut best: Option<(Entity, f32)> = None;
        self.query_rect(x, y, radius * 2.0, radius * 2.0, |e| {
            if !filter(e) {
                return;
            }
            let Some((ex, ey)) = position_of(e) else { return };
            let d2 = (ex - x).powi(2) + (ey - y).powi(2);
            if d2 > radius * radius {
                return;
            }
            match best {
                None => best = Some((e, d2)),
                Some((cur, cur_d2)) => {
                    if d2 < cur_d2 || (d2 == cur_d2 && e.index() < cur.index()) {
                        best = Some((e, d2));
                    }
                }
            }
        });
        best.map(|(e, _)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::entity::EntityAllocator;

    fn entities(n: usize) -> Vec<Entity> {
        let mut alloc = EntityAllocator::new(64);
        (0..n).map(|_| alloc.allocate().unwrap()).collect()
    }

    #[test]
    fn query_visits_each_entity_once_across_overlapping_cells() {
        let mut grid = SpatialHash::new(64.0);
        let es = entities(1);
        // A wide entity straddling four cells.
        grid.insert(es[0], &Bounds { x: 0.0, y: 0.0, half_w: 40.0, half_h: 40.0 });

        let mut seen = Vec::new();
        grid.query_rect(0.0, 0.0, 200.0, 200.0, |e| seen.push(e));
        assert_eq!(seen, vec![es[0]]);
    }

    #[test]
    fn find_nearest_breaks_ties_by_index() {
        let mut grid = SpatialHash::new(64.0);
        let es = entities(2);
        grid.insert(es[0], &Bounds { x: 10.0, y: 0.0, half_w: 1.0, half_h: 1.0 });
        grid.insert(es[1], &Bounds { x: -10.0, y: 0.0, half_w: 1.0, half_h: 1.0 });
        let positions = |e: Entity| {
            if e == es[0] { Some((10.0, 0.0)) } else { Some((-10.0, 0.0)) }
        };
        let nearest = grid.find_nearest(0.0, 0.0, 50.0, |_| true, positions);
        assert_eq!(nearest, Some(es[0]));
    }
}
