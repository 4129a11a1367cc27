//! Axis-aligned bounding box.
//!
//! Used for body bounds (advisory, refreshed after position updates),
//! static pinning regions, and the extent of volumetric particle sources.

use serde::{Deserialize, Serialize};
use verdure_types::{VerdureError, VerdureResult};

use crate::Vec3;

/// An axis-aligned box described by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from two corners.
    ///
    /// Fails with `InvalidArgument` when any component of `min` exceeds `max`
    /// or a corner is not finite.
    pub fn new(min: Vec3, max: Vec3) -> VerdureResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(VerdureError::InvalidArgument(format!(
                "Bounding box corners must be finite, got min={min} max={max}"
            )));
        }
        if min.cmpgt(max).any() {
            return Err(VerdureError::InvalidArgument(format!(
                "Bounding box has negative extent: min={min} max={max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// An inverted box that contains nothing. Expanding it by a point
    /// yields a zero-volume box at that point.
    pub const fn empty() -> Self {
        Self {
            min: Vec3::splat(f64::INFINITY),
            max: Vec3::splat(f64::NEG_INFINITY),
        }
    }

    /// Smallest box enclosing every point. Empty input gives [`Aabb::empty`].
    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::empty(), |mut acc, &p| {
            acc.expand_point(p);
            acc
        })
    }

    /// Grows the box to include `p` (component-wise min/max).
    #[inline]
    pub fn expand_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Returns the box grown by `amount` on every axis.
    pub fn inflate(&self, amount: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    /// True when the box contains no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// True when the two boxes overlap (touching counts).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Size along each axis (zero for an empty box).
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.extent().x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.extent().y
    }

    #[inline]
    pub fn depth(&self) -> f64 {
        self.extent().z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
