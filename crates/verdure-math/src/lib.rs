//! # verdure-math
//!
//! Linear algebra primitives for the Verdure solver.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types as `Vec2`, `Vec3`, `Mat4`
//! - Axis-aligned bounding boxes ([`Aabb`]) for bounds and static regions
//! - Vector helpers with a single degenerate-length policy
//! - Rest-pose transforms applied to generated particle lattices

pub mod aabb;
pub mod transform;
pub mod vector;

// Solver math is double precision throughout.
pub use glam::{DMat4 as Mat4, DQuat as Quat, DVec2 as Vec2, DVec3 as Vec3, EulerRot};

pub use aabb::Aabb;
pub use transform::rest_pose;
pub use vector::{angle_between_deg, try_normalize};
