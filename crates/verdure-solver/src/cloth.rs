//! Body factories for generated particle sources.

use tracing::debug;
use verdure_math::{Mat4, Vec3};
use verdure_mesh::ParticleSource;
use verdure_types::{VerdureError, VerdureResult};

use crate::body::Body;
use crate::config::BodyConfig;
use crate::constraint::{BendAxis, BendingParams};

fn place(source: &ParticleSource, config: &BodyConfig, rest_pose: &Mat4) -> VerdureResult<Body> {
    config.validate()?;
    source.validate()?;
    let positions: Vec<Vec3> = source
        .positions
        .iter()
        .map(|&p| rest_pose.transform_point3(p))
        .collect();
    let mut body = Body::from_positions(positions, config.particle_radius, config.particle_mass)?;
    body.damping = config.damping;
    Ok(body)
}

impl Body {
    /// Builds a cloth body from a sheet source.
    ///
    /// Distance constraints run along rows, columns and both shear diagonals.
    /// Bending triples run along columns (vertical) first, then along rows
    /// (horizontal); all of them can break.
    pub fn cloth(
        source: &ParticleSource,
        config: &BodyConfig,
        rest_pose: &Mat4,
    ) -> VerdureResult<Self> {
        let (rows, cols) = source.topology.sheet_dims().ok_or_else(|| {
            VerdureError::InvalidArgument(format!(
                "Cloth needs a grid or plane source, got {:?}",
                source.topology
            ))
        })?;
        let width = rows + 1;
        let height = cols + 1;
        if source.particle_count() != width * height {
            return Err(VerdureError::InvalidMesh(format!(
                "Sheet {rows}x{cols} needs {} particles, source has {}",
                width * height,
                source.particle_count()
            )));
        }

        let mut body = place(source, config, rest_pose)?;
        let stretch = config.stretch_stiffness;

        for y in 0..height {
            for x in 0..width - 1 {
                body.add_distance_constraint(y * width + x, y * width + x + 1, stretch)?;
            }
        }
        for x in 0..width {
            for y in 0..height - 1 {
                body.add_distance_constraint(y * width + x, (y + 1) * width + x, stretch)?;
            }
        }
        for y in 0..height - 1 {
            for x in 0..width - 1 {
                body.add_distance_constraint(y * width + x, (y + 1) * width + x + 1, stretch)?;
                body.add_distance_constraint((y + 1) * width + x, y * width + x + 1, stretch)?;
            }
        }

        let params = BendingParams::from(config);
        for i in 0..=rows {
            for j in 0..cols.saturating_sub(1) {
                let triple = [j * width + i, (j + 1) * width + i, (j + 2) * width + i];
                body.add_bending_constraint(triple, BendAxis::Vertical, &params)?;
            }
        }
        for i in 0..rows.saturating_sub(1) {
            for j in 0..=cols {
                let triple = [j * width + i, j * width + i + 1, j * width + i + 2];
                body.add_bending_constraint(triple, BendAxis::Horizontal, &params)?;
            }
        }

        debug!(
            particles = body.particle_count(),
            constraints = body.live_constraints().len(),
            bending = body.total_bending_count(),
            "cloth body created"
        );
        Ok(body)
    }

    /// Builds a body with one distance constraint per unique source edge.
    pub fn deformable(
        source: &ParticleSource,
        config: &BodyConfig,
        rest_pose: &Mat4,
    ) -> VerdureResult<Self> {
        let mut body = place(source, config, rest_pose)?;
        for (a, b) in source.edges() {
            body.add_distance_constraint(a as usize, b as usize, config.stretch_stiffness)?;
        }

        debug!(
            particles = body.particle_count(),
            constraints = body.live_constraints().len(),
            "deformable body created"
        );
        Ok(body)
    }
}
