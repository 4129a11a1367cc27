//! Contact records.
//!
//! Records are transient: stages rebuild them every step from predicted
//! positions and the host's contact flags. Each record resolves itself
//! against the body slice it was found in.

use serde::{Deserialize, Serialize};
use tracing::trace;
use verdure_solver::Body;
use verdure_types::constants::{EPSILON, NORMAL_EPSILON_SQ};
use verdure_types::{BodyId, ExternalBodyId};

use crate::external::ContactPolicy;

/// Overlapping particles of two different bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyBodyContact {
    pub body_a: BodyId,
    pub particle_a: u32,
    pub body_b: BodyId,
    pub particle_b: u32,
}

/// Borrows two distinct bodies mutably.
fn pair_mut(bodies: &mut [Body], a: usize, b: usize) -> Option<(&mut Body, &mut Body)> {
    if a == b || a.max(b) >= bodies.len() {
        return None;
    }
    if a < b {
        let (lo, hi) = bodies.split_at_mut(b);
        Some((&mut lo[a], &mut hi[0]))
    } else {
        let (lo, hi) = bodies.split_at_mut(a);
        Some((&mut hi[0], &mut lo[b]))
    }
}

impl BodyBodyContact {
    /// Pushes both particles apart by `di` times their overlap, split by
    /// inverse mass. Returns the separation applied, or `None` when the
    /// particles no longer overlap or cannot be separated.
    pub fn resolve_contact(&self, bodies: &mut [Body], di: f64) -> Option<f64> {
        let (a, b) = pair_mut(bodies, self.body_a.index(), self.body_b.index())?;
        let (i, j) = (self.particle_a as usize, self.particle_b as usize);

        let d = a.particles.predicted[i] - b.particles.predicted[j];
        let dist = d.length();
        let overlap = a.particle_radius() + b.particle_radius() - dist;
        if overlap <= 0.0 {
            return None;
        }
        if dist < EPSILON {
            trace!(
                body_a = self.body_a.0,
                body_b = self.body_b.0,
                "coincident contact, no separating normal"
            );
            return None;
        }

        let wa = a.particles.inv_mass(i);
        let wb = b.particles.inv_mass(j);
        let w = wa + wb;
        if w <= 0.0 {
            return None;
        }

        let separation = di * overlap;
        let corr = d / dist * (separation / w);
        a.particles.predicted[i] += corr * wa;
        a.particles.positions[i] += corr * wa;
        b.particles.predicted[j] -= corr * wb;
        b.particles.positions[j] -= corr * wb;
        Some(separation)
    }
}

/// A particle the host reported in contact with a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyExternalContact {
    pub body: BodyId,
    pub particle: u32,
    /// The rigid body that was hit, if known.
    pub external: Option<ExternalBodyId>,
}

impl BodyExternalContact {
    /// Moves the particle along the host's contact normal. The rigid body
    /// never moves. Returns the correction length applied.
    pub fn resolve_contact_external(
        &self,
        bodies: &mut [Body],
        di: f64,
        policy: ContactPolicy,
        dt: f64,
    ) -> Option<f64> {
        let body = bodies.get_mut(self.body.index())?;
        let i = self.particle as usize;
        let p = &mut body.particles;
        if !p.is_contact[i] || p.is_static[i] {
            return None;
        }

        let normal = p.external_hit[i].normal;
        if normal.length_squared() <= NORMAL_EPSILON_SQ {
            trace!(body = self.body.0, particle = i, "contact normal too short");
            return None;
        }
        let n = normal.normalize();

        let step = match policy {
            ContactPolicy::FixedStep(step) => di * step,
            ContactPolicy::PenetrationDistance => di * p.penetration_distance[i] * dt,
        };
        let delta = n * step;
        p.predicted[i] += delta;
        p.positions[i] += delta;
        Some(step.abs())
    }
}
