//! # verdure-solver
//!
//! Position-based dynamics for breakable vegetation.
//!
//! ## Key Types
//!
//! - [`Body`]: Particle arrays plus a constraint arena with live, bending,
//!   broken and static lists
//! - [`Constraint`]: Distance, bending and static pin constraints
//! - [`Solver`]: Owns bodies, forces and collision stages; runs the step loop
//! - [`CollisionStage`]: Seam for the contact stages in `verdure-contact`
//! - [`SolverConfig`] / [`BodyConfig`]: Serde-backed configuration

pub mod body;
pub mod cloth;
pub mod collision;
pub mod config;
pub mod constraint;
pub mod force;
pub mod solver;

pub use body::{Body, ContactInfo, Particles};
pub use collision::{CollisionContext, CollisionStage, ContactSummary, ExternalBody};
pub use config::{BodyConfig, SolverConfig};
pub use constraint::{
    BendAxis, BendingConstraint, BendingParams, Constraint, DistanceConstraint, StaticPin,
};
pub use force::ExternalForce;
pub use solver::{Solver, StepReport};
