//! Strongly-typed identifiers for simulation entities.
//!
//! Newtype wrappers prevent accidental mixing of body handles
//! with constraint handles or external rigid body handles.

use serde::{Deserialize, Serialize};

/// Index of a deformable body inside a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Index into a body's constraint arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstraintId(pub u32);

/// Handle of a host-owned rigid body (e.g. a foot collider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalBodyId(pub u32);

impl BodyId {
    /// Returns the raw index as `usize` for slice indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ConstraintId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ExternalBodyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for BodyId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for ConstraintId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for ExternalBodyId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}
