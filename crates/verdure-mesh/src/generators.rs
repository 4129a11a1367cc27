//! Procedural particle generators.
//!
//! Both generators are pure and deterministic: the same parameters always
//! produce the same positions in the same order.

use tracing::debug;
use verdure_math::{Aabb, Vec3};
use verdure_types::{VerdureError, VerdureResult};

use crate::source::{ParticleSource, SourceTopology};

fn check_radius(radius: f64) -> VerdureResult<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(VerdureError::InvalidArgument(format!(
            "Particle radius must be positive, got {radius}"
        )));
    }
    Ok(())
}

/// Triangulates a `(rows+1) x (cols+1)` sheet indexed `j*(rows+1)+i`.
///
/// The quad diagonal alternates with `(i + j) % 2` so the sheet has no
/// preferred shear direction.
fn triangulate_sheet(rows: usize, cols: usize) -> Vec<u32> {
    let stride = rows + 1;
    let mut indices = Vec::with_capacity(rows * cols * 6);
    for j in 0..cols {
        for i in 0..rows {
            let i0 = (j * stride + i) as u32;
            let i1 = i0 + 1;
            let i2 = i0 + stride as u32;
            let i3 = i2 + 1;

            if (i + j) % 2 != 0 {
                indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            } else {
                indices.extend_from_slice(&[i0, i2, i3, i0, i3, i1]);
            }
        }
    }
    indices
}

// ─── Grid ─────────────────────────────────────────────────────

/// A flat rectangular sheet of particles in the XZ plane.
///
/// Particles are spaced by the particle diameter and the sheet is centred on
/// the origin at `y = 0`. `rows` counts quads along X, `cols` along Z.
///
/// # Example
/// ```
/// use verdure_mesh::GridSource;
/// let source = GridSource::new(2, 2, 0.05).unwrap().build();
/// assert_eq!(source.particle_count(), 9);  // 3×3 particles
/// assert_eq!(source.triangle_count(), 8); // 2×2 quads × 2 tris each
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSource {
    pub rows: usize,
    pub cols: usize,
    pub radius: f64,
}

impl GridSource {
    pub fn new(rows: usize, cols: usize, radius: f64) -> VerdureResult<Self> {
        check_radius(radius)?;
        Ok(Self { rows, cols, radius })
    }

    /// Sizes the grid to fit a `width x depth` rectangle at the given radius.
    pub fn from_extent(radius: f64, width: f64, depth: f64) -> VerdureResult<Self> {
        check_radius(radius)?;
        if !(width >= 0.0 && depth >= 0.0) {
            return Err(VerdureError::InvalidArgument(format!(
                "Grid extent must be non-negative, got {width} x {depth}"
            )));
        }
        let diameter = 2.0 * radius;
        Self::new(
            (width / diameter).floor() as usize,
            (depth / diameter).floor() as usize,
            radius,
        )
    }

    #[inline]
    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }

    pub fn build(&self) -> ParticleSource {
        let d = self.diameter();
        let half_w = self.rows as f64 * d * 0.5;
        let half_d = self.cols as f64 * d * 0.5;

        let mut positions = Vec::with_capacity((self.rows + 1) * (self.cols + 1));
        for j in 0..=self.cols {
            for i in 0..=self.rows {
                positions.push(Vec3::new(
                    i as f64 * d - half_w,
                    0.0,
                    j as f64 * d - half_d,
                ));
            }
        }

        ParticleSource {
            positions,
            indices: triangulate_sheet(self.rows, self.cols),
            topology: SourceTopology::Grid {
                rows: self.rows,
                cols: self.cols,
            },
        }
    }
}

// ─── Volume ───────────────────────────────────────────────────

/// A box filled with particles at cell centres, connected by five
/// tetrahedra per cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSource {
    pub radius: f64,
    pub bounds: Aabb,
}

impl VolumeSource {
    pub fn new(radius: f64, bounds: Aabb) -> VerdureResult<Self> {
        check_radius(radius)?;
        if bounds.is_empty() || !bounds.min.is_finite() || !bounds.max.is_finite() {
            return Err(VerdureError::InvalidArgument(format!(
                "Volume bounds are inverted or non-finite: min={} max={}",
                bounds.min, bounds.max
            )));
        }
        Ok(Self { radius, bounds })
    }

    #[inline]
    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }

    /// Particle counts along each axis.
    pub fn counts(&self) -> (usize, usize, usize) {
        let d = self.diameter();
        (
            (self.bounds.width() / d).floor() as usize,
            (self.bounds.height() / d).floor() as usize,
            (self.bounds.depth() / d).floor() as usize,
        )
    }

    pub fn build(&self) -> ParticleSource {
        let (nx, ny, nz) = self.counts();

        if nx == 0 || ny == 0 || nz == 0 {
            debug!(nx, ny, nz, "volume too small for a single particle");
            return ParticleSource::empty(SourceTopology::Tetrahedral { nx, ny, nz });
        }
        if nx == 1 || ny == 1 || nz == 1 {
            debug!(nx, ny, nz, "volume is one particle thick, building a plane");
            return self.build_plane([nx, ny, nz]);
        }

        let d = self.diameter();
        let min = self.bounds.min;
        let mut positions = Vec::with_capacity(nx * ny * nz);
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    positions.push(Vec3::new(
                        min.x + d * x as f64 + self.radius,
                        min.y + d * y as f64 + self.radius,
                        min.z + d * z as f64 + self.radius,
                    ));
                }
            }
        }

        let idx = |x: usize, y: usize, z: usize| (x + y * nx + z * nx * ny) as u32;
        let mut indices = Vec::with_capacity((nx - 1) * (ny - 1) * (nz - 1) * 20);
        for z in 0..nz - 1 {
            for y in 0..ny - 1 {
                for x in 0..nx - 1 {
                    let p0 = idx(x, y, z);
                    let p1 = idx(x + 1, y, z);
                    let p2 = idx(x + 1, y, z + 1);
                    let p3 = idx(x, y, z + 1);
                    let p4 = idx(x, y + 1, z);
                    let p5 = idx(x + 1, y + 1, z);
                    let p6 = idx(x + 1, y + 1, z + 1);
                    let p7 = idx(x, y + 1, z + 1);

                    // Alternate the split so neighbouring cells share faces.
                    if (x + y + z) % 2 == 1 {
                        indices.extend_from_slice(&[
                            p2, p1, p6, p3, //
                            p6, p3, p4, p7, //
                            p4, p1, p6, p5, //
                            p3, p1, p4, p0, //
                            p6, p1, p4, p3,
                        ]);
                    } else {
                        indices.extend_from_slice(&[
                            p0, p2, p5, p1, //
                            p7, p2, p0, p3, //
                            p5, p2, p7, p6, //
                            p7, p0, p5, p4, //
                            p0, p2, p7, p5,
                        ]);
                    }
                }
            }
        }

        ParticleSource {
            positions,
            indices,
            topology: SourceTopology::Tetrahedral { nx, ny, nz },
        }
    }

    /// Sheet one radius above the thin side of the bounds, spanning the two
    /// other axes. A box thin in Y keeps the X/Z footprint; otherwise rows run
    /// along X (or Z when X is thin) and columns along Y.
    fn build_plane(&self, counts: [usize; 3]) -> ParticleSource {
        let (thin, a, b) = if counts[1] == 1 {
            (1, 0, 2)
        } else if counts[0] == 1 {
            (0, 2, 1)
        } else {
            (2, 0, 1)
        };
        let (rows, cols) = (counts[a], counts[b]);
        let extent = self.bounds.extent();
        let da = extent[a] / rows as f64;
        let db = extent[b] / cols as f64;

        let mut positions = Vec::with_capacity((rows + 1) * (cols + 1));
        for j in 0..=cols {
            for i in 0..=rows {
                let mut p = self.bounds.min;
                p[thin] += self.radius;
                p[a] += da * i as f64;
                p[b] += db * j as f64;
                positions.push(p);
            }
        }
        ParticleSource {
            positions,
            indices: triangulate_sheet(rows, cols),
            topology: SourceTopology::Plane { rows, cols },
        }
    }
}
