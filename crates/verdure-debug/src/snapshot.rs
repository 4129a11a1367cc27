//! State snapshot serialization for replay and debugging.

use std::path::Path;

use serde::{Deserialize, Serialize};
use verdure_math::{Aabb, Vec3};
use verdure_solver::{Body, Solver};
use verdure_types::{ConstraintId, VerdureError, VerdureResult};

/// Per-body state at the snapshot's timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub is_static: Vec<bool>,
    /// Broken bending constraints, oldest first.
    pub broken_constraints: Vec<ConstraintId>,
    pub living_ratio: f64,
    pub aggregate_stiffness: f64,
}

impl BodySnapshot {
    pub fn capture(body: &Body) -> Self {
        Self {
            positions: body.particles.positions.clone(),
            velocities: body.particles.velocities.clone(),
            is_static: body.particles.is_static.clone(),
            broken_constraints: body.broken_constraints().iter().copied().collect(),
            living_ratio: body.living_ratio(),
            aggregate_stiffness: body.aggregate_bending_stiffness(),
        }
    }

    pub fn particle_count(&self) -> usize {
        self.positions.len()
    }

    pub fn max_speed(&self) -> f64 {
        self.velocities
            .iter()
            .map(|v| v.length())
            .fold(0.0, f64::max)
    }
}

/// A complete solver snapshot.
///
/// Serialized with `bincode` for compact binary output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Timestep index when this snapshot was taken.
    pub timestep: u64,
    /// Simulation time in seconds.
    pub sim_time: f64,
    pub bodies: Vec<BodySnapshot>,
}

impl StateSnapshot {
    pub fn capture(solver: &Solver) -> Self {
        Self {
            timestep: solver.timestep(),
            sim_time: solver.sim_time(),
            bodies: solver.bodies().iter().map(BodySnapshot::capture).collect(),
        }
    }

    pub fn particle_count(&self) -> usize {
        self.bodies.iter().map(BodySnapshot::particle_count).sum()
    }

    pub fn broken_count(&self) -> usize {
        self.bodies.iter().map(|b| b.broken_constraints.len()).sum()
    }

    /// Bounding box of every particle position.
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for p in self.bodies.iter().flat_map(|b| &b.positions) {
            bounds.expand_point(*p);
        }
        bounds
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> VerdureResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| VerdureError::Serialization(e.to_string()))
    }

    /// Deserializes from binary format.
    pub fn from_bytes(data: &[u8]) -> VerdureResult<Self> {
        bincode::deserialize(data)
            .map_err(|e| VerdureError::Serialization(format!("Snapshot deserialization failed: {e}")))
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> VerdureResult<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn read_from(path: impl AsRef<Path>) -> VerdureResult<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }
}
