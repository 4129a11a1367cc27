//! Vector helpers shared by constraints and contacts.
//!
//! Normalization policy: a vector shorter than [`EPSILON`] cannot be
//! normalized. The fallible form reports `DegenerateGeometry`; hot loops use
//! glam's `try_normalize` directly and skip the correction on `None`.

use verdure_types::constants::EPSILON;
use verdure_types::{VerdureError, VerdureResult};

use crate::Vec3;

/// Normalizes `v`, failing with `DegenerateGeometry` for (near) zero length.
pub fn try_normalize(v: Vec3) -> VerdureResult<Vec3> {
    let len = v.length();
    if !len.is_finite() || len < EPSILON {
        return Err(VerdureError::DegenerateGeometry(format!(
            "Cannot normalize vector {v} of length {len:e}"
        )));
    }
    Ok(v / len)
}

/// Unsigned angle between two vectors in degrees, in `[0, 180]`.
///
/// Returns `None` if either vector is degenerate.
pub fn angle_between_deg(a: Vec3, b: Vec3) -> Option<f64> {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if !denom.is_finite() || denom < EPSILON * EPSILON {
        return None;
    }
    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}
