//! Particle source representation.
//!
//! A source is the immutable output of a generator: rest positions and a flat
//! index buffer whose element arity depends on the topology (3 for
//! triangulated sheets, 4 for tetrahedral volumes).

use serde::{Deserialize, Serialize};
use verdure_math::{Aabb, Mat4, Vec3};
use verdure_types::{VerdureError, VerdureResult};

/// Lattice layout of a [`ParticleSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceTopology {
    /// Regular sheet with `(rows+1) * (cols+1)` particles, index `j*(rows+1)+i`.
    Grid { rows: usize, cols: usize },
    /// Sheet produced by the volume fallback. Same layout as `Grid`.
    Plane { rows: usize, cols: usize },
    /// Cell-centred volume lattice, index `x + y*nx + z*nx*ny`.
    Tetrahedral { nx: usize, ny: usize, nz: usize },
}

impl SourceTopology {
    /// Number of indices per element.
    pub fn arity(&self) -> usize {
        match self {
            SourceTopology::Grid { .. } | SourceTopology::Plane { .. } => 3,
            SourceTopology::Tetrahedral { .. } => 4,
        }
    }

    /// Sheet dimensions, if this is a sheet layout.
    pub fn sheet_dims(&self) -> Option<(usize, usize)> {
        match *self {
            SourceTopology::Grid { rows, cols } | SourceTopology::Plane { rows, cols } => {
                Some((rows, cols))
            }
            SourceTopology::Tetrahedral { .. } => None,
        }
    }
}

/// Rest positions and connectivity of a particle lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSource {
    pub positions: Vec<Vec3>,
    /// Flat element indices. Triangles for sheets, tetrahedra for volumes.
    pub indices: Vec<u32>,
    pub topology: SourceTopology,
}

impl ParticleSource {
    /// Creates an empty source of the given topology.
    pub fn empty(topology: SourceTopology) -> Self {
        Self {
            positions: Vec::new(),
            indices: Vec::new(),
            topology,
        }
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of triangles (zero for tetrahedral sources).
    pub fn triangle_count(&self) -> usize {
        match self.topology.arity() {
            3 => self.indices.len() / 3,
            _ => 0,
        }
    }

    /// Number of tetrahedra (zero for sheet sources).
    pub fn tetrahedron_count(&self) -> usize {
        match self.topology.arity() {
            4 => self.indices.len() / 4,
            _ => 0,
        }
    }

    /// Unique undirected edges of all elements, each as `(lo, hi)`, sorted.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let arity = self.topology.arity();
        let mut edges: Vec<(u32, u32)> = self
            .indices
            .chunks_exact(arity)
            .flat_map(|element| {
                let mut pairs = Vec::with_capacity(arity * (arity - 1) / 2);
                for a in 0..arity {
                    for b in (a + 1)..arity {
                        let (i, j) = (element[a], element[b]);
                        pairs.push((i.min(j), i.max(j)));
                    }
                }
                pairs
            })
            .filter(|(i, j)| i != j)
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Bounding box of the rest positions.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }

    /// Validates source integrity.
    ///
    /// Checks:
    /// - Index buffer length is a multiple of the element arity
    /// - Every index refers to an existing particle
    /// - Every position is finite
    pub fn validate(&self) -> VerdureResult<()> {
        let arity = self.topology.arity();
        if self.indices.len() % arity != 0 {
            return Err(VerdureError::InvalidMesh(format!(
                "Index count {} is not a multiple of {arity}",
                self.indices.len()
            )));
        }

        let n = self.positions.len();
        if let Some((slot, &idx)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, &idx)| idx as usize >= n)
        {
            return Err(VerdureError::InvalidMesh(format!(
                "Element {} references particle {idx} but only {n} exist",
                slot / arity
            )));
        }

        if let Some(i) = self.positions.iter().position(|p| !p.is_finite()) {
            return Err(VerdureError::InvalidMesh(format!(
                "Particle {i} has a non-finite position"
            )));
        }

        Ok(())
    }

    /// Returns a copy with every position mapped through `transform`.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        Self {
            positions: self
                .positions
                .iter()
                .map(|&p| transform.transform_point3(p))
                .collect(),
            indices: self.indices.clone(),
            topology: self.topology,
        }
    }
}
