//! # verdure-contact
//!
//! Contact stages plugged into the solver after constraint projection.
//!
//! - [`BodyCollision`]: Sphere overlap between particles of different
//!   bodies, with an optional spatial hash broad phase
//! - [`ExternalCollision`]: Pushes particles out of host-owned rigid bodies
//!   using contact normals and penetration depths supplied by the host
//!
//! Both implement [`verdure_solver::CollisionStage`].

pub mod body_body;
pub mod contact;
pub mod external;
pub mod response;
pub mod spatial_hash;

pub use body_body::{BodyCollision, BroadPhase};
pub use contact::{BodyBodyContact, BodyExternalContact};
pub use external::{ContactPolicy, ExternalCollision};
pub use response::ContactResult;
pub use spatial_hash::SpatialHash;
