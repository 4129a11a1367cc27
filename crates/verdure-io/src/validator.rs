//! Scene validation.
//!
//! Catches data-level errors before any body is built, with messages that
//! name the offending body.

use verdure_types::{VerdureError, VerdureResult};

use crate::contract::{SceneBody, SceneConfig, SourceShape};

/// Validates a complete scene.
///
/// Checks:
/// - Timestep and step count are usable
/// - Solver configuration
/// - Every body's source, rest pose, static region and body configuration
pub fn validate_scene(scene: &SceneConfig) -> VerdureResult<()> {
    if !scene.dt.is_finite() || scene.dt <= 0.0 {
        return Err(VerdureError::InvalidConfig(format!(
            "Timestep dt must be positive, got {}",
            scene.dt
        )));
    }
    if scene.dt > 1.0 {
        return Err(VerdureError::InvalidConfig(
            "Timestep dt > 1.0 is unreasonably large".into(),
        ));
    }
    if scene.steps == 0 {
        return Err(VerdureError::InvalidConfig("Scene must run at least one step".into()));
    }
    if scene.bodies.is_empty() {
        return Err(VerdureError::InvalidConfig("Scene has no bodies".into()));
    }

    scene.solver.validate()?;

    for (i, body) in scene.bodies.iter().enumerate() {
        validate_body(body).map_err(|e| VerdureError::InvalidConfig(format!("Body {i}: {e}")))?;
    }
    Ok(())
}

fn validate_body(body: &SceneBody) -> VerdureResult<()> {
    body.config.validate()?;

    match body.source {
        SourceShape::Grid { rows, cols } => {
            if rows == 0 || cols == 0 {
                return Err(VerdureError::InvalidConfig(format!(
                    "Grid needs at least one row and column, got {rows}x{cols}"
                )));
            }
        }
        SourceShape::Volume { min, max } => {
            if !min.is_finite() || !max.is_finite() || min.cmpgt(max).any() {
                return Err(VerdureError::InvalidConfig(format!(
                    "Volume bounds are inverted or non-finite: min={min} max={max}"
                )));
            }
        }
    }

    if !body.translation.is_finite() || !body.rotation.is_finite() {
        return Err(VerdureError::InvalidConfig("Rest pose must be finite".into()));
    }

    if let Some(region) = &body.static_region {
        if !region.min.is_finite() || !region.max.is_finite() || region.is_empty() {
            return Err(VerdureError::InvalidConfig(format!(
                "Static region is inverted or non-finite: min={} max={}",
                region.min, region.max
            )));
        }
    }
    Ok(())
}
