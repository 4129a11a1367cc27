//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Default simulation timestep (seconds). 1/60th of a second.
pub const DEFAULT_DT: f64 = 1.0 / 60.0;

/// Default number of constraint projection iterations per timestep.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 4;

/// Default number of contact resolution passes per timestep.
pub const DEFAULT_COLLISION_ITERATIONS: u32 = 2;

/// Velocities below `sleep_threshold * dt` are zeroed at integration.
pub const DEFAULT_SLEEP_THRESHOLD: f64 = 1.0;

/// Fixed correction step used by the fixed-step external contact policy (meters).
pub const DEFAULT_COLLISION_FIXED_STEP: f64 = 0.001;

/// Stiffness ratio above which a broken bending constraint is restored.
pub const RECOVERY_RATIO_THRESHOLD: f64 = 0.99;

/// A bend is measured against a straight hinge (degrees).
pub const STRAIGHT_ANGLE_DEG: f64 = 180.0;

/// Lengths below this are treated as degenerate.
pub const EPSILON: f64 = 1.0e-10;

/// Squared-length threshold for external contact normals.
pub const NORMAL_EPSILON_SQ: f64 = 1.0e-9;
