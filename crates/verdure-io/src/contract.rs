//! Scene description types.
//!
//! These types define the file boundary of the solver. They round-trip
//! through TOML (scene files) and JSON.
//!
//! ```toml
//! dt = 0.0166
//! steps = 300
//! body_collisions = true
//!
//! [solver]
//! solver_iterations = 8
//!
//! [[bodies]]
//! source = { kind = "grid", rows = 10, cols = 10 }
//! translation = [0.0, 1.0, 0.0]
//! static_region = { min = [-1.0, 0.9, -1.0], max = [1.0, 1.1, -0.4] }
//!
//! [bodies.config]
//! particle_radius = 0.05
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use verdure_contact::BroadPhase;
use verdure_math::{Aabb, Vec3};
use verdure_solver::{BodyConfig, SolverConfig};
use verdure_types::constants::DEFAULT_DT;
use verdure_types::{VerdureError, VerdureResult};

/// A complete simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Timestep in seconds.
    pub dt: f64,
    /// Number of timesteps to run.
    pub steps: u32,
    pub solver: SolverConfig,
    /// Collide particles of different bodies.
    pub body_collisions: bool,
    pub broad_phase: BroadPhase,
    /// Resolve host-reported contacts with external rigid bodies.
    pub external_collisions: bool,
    pub bodies: Vec<SceneBody>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            steps: 120,
            solver: SolverConfig::default(),
            body_collisions: false,
            broad_phase: BroadPhase::default(),
            external_collisions: false,
            bodies: Vec::new(),
        }
    }
}

impl SceneConfig {
    pub fn from_toml_str(content: &str) -> VerdureResult<Self> {
        toml::from_str(content).map_err(|e| VerdureError::Serialization(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> VerdureResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> VerdureResult<String> {
        toml::to_string(self).map_err(|e| VerdureError::Serialization(e.to_string()))
    }

    /// Total simulated time in seconds.
    pub fn duration(&self) -> f64 {
        self.dt * self.steps as f64
    }
}

/// Where a body's particles come from. Particle spacing is twice the body's
/// `particle_radius`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceShape {
    /// A `rows x cols` sheet in the XZ plane, built as cloth.
    Grid { rows: usize, cols: usize },
    /// A box filled with particles. Built as cloth when the box is one
    /// particle thick, as a tetrahedral deformable otherwise.
    Volume { min: Vec3, max: Vec3 },
}

/// One body of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneBody {
    pub source: SourceShape,
    /// Rest-pose translation (meters).
    #[serde(default)]
    pub translation: Vec3,
    /// Rest-pose rotation as YXZ Euler angles (degrees).
    #[serde(default)]
    pub rotation: Vec3,
    /// World-space region whose particles are pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_region: Option<Aabb>,
    #[serde(default)]
    pub config: BodyConfig,
}

impl SceneBody {
    pub fn new(source: SourceShape) -> Self {
        Self {
            source,
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            static_region: None,
            config: BodyConfig::default(),
        }
    }
}
