//! Rest-pose transforms for generated particle lattices.

use crate::{EulerRot, Mat4, Vec3};

/// Builds the translate·rotate matrix used to place a generated lattice.
///
/// `rotation_deg` holds Euler angles in degrees; rotation is applied about Z,
/// then X, then Y (the convention of typical game-engine transforms).
pub fn rest_pose(translation: Vec3, rotation_deg: Vec3) -> Mat4 {
    let rotation = Mat4::from_euler(
        EulerRot::YXZ,
        rotation_deg.y.to_radians(),
        rotation_deg.x.to_radians(),
        rotation_deg.z.to_radians(),
    );
    Mat4::from_translation(translation) * rotation
}
