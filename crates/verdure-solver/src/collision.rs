//! Collision stage interface.
//!
//! Contact detection and resolution live in `verdure-contact`; the solver
//! only knows this trait. Stages run after constraint projection, against
//! predicted positions.

use verdure_math::Vec3;
use verdure_types::VerdureResult;

use crate::body::Body;

/// A rigid body owned by the host. The solver never moves it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalBody {
    pub label: String,
    pub position: Vec3,
}

impl ExternalBody {
    pub fn new(label: impl Into<String>, position: Vec3) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }
}

/// Read-only step data handed to every collision stage.
#[derive(Debug, Clone, Copy)]
pub struct CollisionContext<'a> {
    pub dt: f64,
    /// Resolution passes; each pass uses `di = 1 / iterations`.
    pub iterations: u32,
    pub use_penetration_distance: bool,
    pub fixed_step: f64,
    pub external_bodies: &'a [ExternalBody],
}

impl CollisionContext<'_> {
    #[inline]
    pub fn di(&self) -> f64 {
        1.0 / self.iterations.max(1) as f64
    }
}

/// Contacts a stage found this step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactSummary {
    pub body_contacts: u32,
    pub external_contacts: u32,
}

impl std::ops::AddAssign for ContactSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.body_contacts += rhs.body_contacts;
        self.external_contacts += rhs.external_contacts;
    }
}

/// A pluggable contact stage.
///
/// ```text
/// solver.add_collision(Box::new(BodyCollision::new()));
/// solver.add_collision(Box::new(ExternalCollision::new()));
/// ```
pub trait CollisionStage: Send {
    /// Finds contacts among `bodies` and resolves them in place.
    fn resolve(
        &mut self,
        bodies: &mut [Body],
        ctx: &CollisionContext<'_>,
    ) -> VerdureResult<ContactSummary>;

    /// Returns the stage's name.
    fn name(&self) -> &str;
}
