//! Solver and body configuration.
//!
//! Both structs deserialize with `#[serde(default)]`, so a TOML table only
//! needs the fields it overrides.

use serde::{Deserialize, Serialize};
use verdure_types::constants::{
    DEFAULT_COLLISION_FIXED_STEP, DEFAULT_COLLISION_ITERATIONS, DEFAULT_SLEEP_THRESHOLD,
    DEFAULT_SOLVER_ITERATIONS, GRAVITY,
};
use verdure_types::{VerdureError, VerdureResult};

/// Configuration for the simulation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Constraint projection passes per timestep.
    pub solver_iterations: u32,

    /// Contact resolution passes per timestep.
    pub collision_iterations: u32,

    /// Particles slower than `sleep_threshold * dt` are put to rest.
    pub sleep_threshold: f64,

    /// Gravity vector [gx, gy, gz] in m/s².
    pub gravity: [f64; 3],

    /// Registers a gravity force when the solver is created.
    pub apply_gravity: bool,

    /// Resolve external contacts by `penetration * dt` instead of a fixed step.
    pub use_penetration_distance: bool,

    /// Correction length for the fixed-step contact policy (meters).
    pub collision_fixed_step: f64,

    /// Let broken bending constraints grow back.
    pub activate_regeneration: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            collision_iterations: DEFAULT_COLLISION_ITERATIONS,
            sleep_threshold: DEFAULT_SLEEP_THRESHOLD,
            gravity: [0.0, -GRAVITY, 0.0],
            apply_gravity: true,
            use_penetration_distance: false,
            collision_fixed_step: DEFAULT_COLLISION_FIXED_STEP,
            activate_regeneration: false,
        }
    }
}

impl SolverConfig {
    /// Creates a config for debugging (fewer passes).
    pub fn debug() -> Self {
        Self {
            solver_iterations: 2,
            collision_iterations: 1,
            ..Default::default()
        }
    }

    /// Creates a high-quality config (more passes, no sleeping).
    pub fn high_quality() -> Self {
        Self {
            solver_iterations: 16,
            collision_iterations: 4,
            sleep_threshold: 0.0,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> VerdureResult<()> {
        if self.solver_iterations == 0 {
            return Err(VerdureError::InvalidConfig(
                "solver_iterations must be at least 1".into(),
            ));
        }
        if self.collision_iterations == 0 {
            return Err(VerdureError::InvalidConfig(
                "collision_iterations must be at least 1".into(),
            ));
        }
        if !self.sleep_threshold.is_finite() || self.sleep_threshold < 0.0 {
            return Err(VerdureError::InvalidConfig(format!(
                "sleep_threshold must be non-negative, got {}",
                self.sleep_threshold
            )));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(VerdureError::InvalidConfig(format!(
                "gravity must be finite, got {:?}",
                self.gravity
            )));
        }
        if !self.collision_fixed_step.is_finite() || self.collision_fixed_step < 0.0 {
            return Err(VerdureError::InvalidConfig(format!(
                "collision_fixed_step must be non-negative, got {}",
                self.collision_fixed_step
            )));
        }
        Ok(())
    }
}

/// Physical and lifecycle parameters of one body.
///
/// Angles are in degrees and measured as the deviation from a straight hinge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub particle_radius: f64,
    pub particle_mass: f64,
    /// Velocity damping rate (1/s).
    pub damping: f64,
    /// Stiffness of distance constraints, in `[0, 1]`.
    pub stretch_stiffness: f64,
    /// Initial (and maximum) stiffness of bending constraints, in `[0, 1]`.
    pub bend_stiffness: f64,
    /// Bending constraints break past this deviation.
    pub breaking_threshold_angle: f64,
    /// Contact only degrades bending constraints past this deviation.
    pub degradation_threshold_angle: f64,
    /// Seconds for a degraded constraint to regain its stiffness.
    pub recuperation_time: f64,
    /// Stiffness lost per contact.
    pub step_stiffness: f64,
    /// Seconds a broken constraint stays broken before it may recover.
    pub growing_time: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            particle_radius: 0.05,
            particle_mass: 1.0,
            damping: 1.0,
            stretch_stiffness: 0.25,
            bend_stiffness: 0.5,
            breaking_threshold_angle: 60.0,
            degradation_threshold_angle: 10.0,
            recuperation_time: 5.0,
            step_stiffness: 0.1,
            growing_time: 0.0,
        }
    }
}

impl BodyConfig {
    pub fn validate(&self) -> VerdureResult<()> {
        fn positive(name: &str, value: f64) -> VerdureResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(VerdureError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        }
        fn unit(name: &str, value: f64) -> VerdureResult<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(VerdureError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )))
            }
        }
        fn non_negative(name: &str, value: f64) -> VerdureResult<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(VerdureError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )))
            }
        }

        positive("particle_radius", self.particle_radius)?;
        positive("particle_mass", self.particle_mass)?;
        non_negative("damping", self.damping)?;
        unit("stretch_stiffness", self.stretch_stiffness)?;
        unit("bend_stiffness", self.bend_stiffness)?;
        non_negative("breaking_threshold_angle", self.breaking_threshold_angle)?;
        non_negative("degradation_threshold_angle", self.degradation_threshold_angle)?;
        // A non-positive recuperation time means instant recovery.
        if self.recuperation_time.is_nan() {
            return Err(VerdureError::InvalidConfig(
                "recuperation_time must be a number".into(),
            ));
        }
        non_negative("step_stiffness", self.step_stiffness)?;
        non_negative("growing_time", self.growing_time)?;
        Ok(())
    }
}
