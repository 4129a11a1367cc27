//! Turns a validated scene into a solver.

use tracing::{debug, info};
use verdure_contact::{BodyCollision, ExternalCollision};
use verdure_math::{rest_pose, Aabb};
use verdure_mesh::{GridSource, ParticleSource, VolumeSource};
use verdure_solver::{Body, Solver};
use verdure_types::VerdureResult;

use crate::contract::{SceneBody, SceneConfig, SourceShape};
use crate::validator::validate_scene;

fn build_source(entry: &SceneBody) -> VerdureResult<ParticleSource> {
    let radius = entry.config.particle_radius;
    match entry.source {
        SourceShape::Grid { rows, cols } => Ok(GridSource::new(rows, cols, radius)?.build()),
        SourceShape::Volume { min, max } => {
            Ok(VolumeSource::new(radius, Aabb::new(min, max)?)?.build())
        }
    }
}

/// Builds one body: sheets become cloth, tetrahedral lattices become
/// deformables. The static region is applied after the rest pose.
pub fn build_body(entry: &SceneBody) -> VerdureResult<Body> {
    let source = build_source(entry)?;
    let pose = rest_pose(entry.translation, entry.rotation);

    let mut body = if source.topology.sheet_dims().is_some() {
        Body::cloth(&source, &entry.config, &pose)?
    } else {
        Body::deformable(&source, &entry.config, &pose)?
    };

    if let Some(region) = &entry.static_region {
        let pinned = body.mark_static(region);
        debug!(pinned, "static region applied");
    }
    Ok(body)
}

/// Validates `scene` and assembles a solver with all of its bodies and
/// collision stages.
pub fn build_solver(scene: &SceneConfig) -> VerdureResult<Solver> {
    validate_scene(scene)?;

    let mut solver = Solver::new(scene.solver.clone())?;
    for entry in &scene.bodies {
        solver.add_body(build_body(entry)?);
    }
    if scene.body_collisions {
        solver.add_collision(Box::new(BodyCollision::with_broad_phase(scene.broad_phase)));
    }
    if scene.external_collisions {
        solver.add_collision(Box::new(ExternalCollision::new()));
    }

    info!(
        bodies = solver.bodies().len(),
        stages = ?solver.collision_stage_names(),
        "scene assembled"
    );
    Ok(solver)
}
