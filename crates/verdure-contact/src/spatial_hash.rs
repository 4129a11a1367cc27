//! Uniform-grid spatial hash over particle positions.
//!
//! Points are binned into cubic cells. A query returns every point in the
//! 27 cells around the query position, so with a cell size of at least the
//! contact distance no overlapping pair is missed.

use std::collections::HashMap;

use verdure_math::Vec3;

pub struct SpatialHash {
    inv_cell_size: f64,
    grid: HashMap<(i32, i32, i32), Vec<u32>>,
    point_count: usize,
}

impl SpatialHash {
    /// Creates an empty hash. Cell size should be the contact distance.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = cell_size.max(1e-6);
        Self {
            inv_cell_size: 1.0 / cell_size,
            grid: HashMap::new(),
            point_count: 0,
        }
    }

    fn cell_key(&self, p: Vec3) -> (i32, i32, i32) {
        let c = (p * self.inv_cell_size).floor();
        (c.x as i32, c.y as i32, c.z as i32)
    }

    /// Replaces the contents with `points`, indexed by position in the slice.
    pub fn rebuild(&mut self, points: &[Vec3]) {
        self.grid.clear();
        self.point_count = points.len();
        for (i, &p) in points.iter().enumerate() {
            let key = self.cell_key(p);
            self.grid.entry(key).or_default().push(i as u32);
        }
    }

    /// Appends the indices of all points near `p` to `out`, in ascending order.
    pub fn query(&self, p: Vec3, out: &mut Vec<u32>) {
        let start = out.len();
        let (cx, cy, cz) = self.cell_key(p);
        for dx in -1..=1_i32 {
            for dy in -1..=1_i32 {
                for dz in -1..=1_i32 {
                    if let Some(points) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) {
                        out.extend_from_slice(points);
                    }
                }
            }
        }
        out[start..].sort_unstable();
    }

    pub fn len(&self) -> usize {
        self.point_count
    }

    pub fn is_empty(&self) -> bool {
        self.point_count == 0
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }
}
