//! External forces applied to every free particle before prediction.

use serde::{Deserialize, Serialize};
use verdure_math::Vec3;

use crate::body::Body;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExternalForce {
    /// Gravitational acceleration (m/s²).
    Gravity(Vec3),
    /// Any other uniform acceleration, e.g. wind.
    Constant(Vec3),
}

impl ExternalForce {
    pub fn acceleration(&self) -> Vec3 {
        match *self {
            ExternalForce::Gravity(g) => g,
            ExternalForce::Constant(a) => a,
        }
    }

    pub fn apply(&self, body: &mut Body, dt: f64) {
        body.apply_acceleration(self.acceleration(), dt);
    }
}
