//! # verdure-mesh
//!
//! Particle sources for deformable bodies.
//!
//! ## Key Types
//!
//! - [`ParticleSource`]: Rest positions plus connectivity, tagged with the
//!   lattice topology that produced them.
//! - [`GridSource`]: A triangulated rectangular sheet in the XZ plane.
//! - [`VolumeSource`]: A tetrahedralized box, falling back to a plane when
//!   the box is one particle thick.

pub mod generators;
pub mod source;

pub use generators::{GridSource, VolumeSource};
pub use source::{ParticleSource, SourceTopology};
