//! Particle contacts between different bodies.
//!
//! Two particles collide when their spheres overlap on predicted positions:
//! `|p_a - p_b| < r_a + r_b`. Particles of the same body never collide with
//! each other; their spacing is held by constraints.

use serde::{Deserialize, Serialize};
use tracing::trace;
use verdure_math::Aabb;
use verdure_solver::{Body, CollisionContext, CollisionStage, ContactSummary};
use verdure_types::{BodyId, VerdureResult};

use crate::contact::BodyBodyContact;
use crate::response::ContactResult;
use crate::spatial_hash::SpatialHash;

/// Candidate generation strategy. Both yield the same contacts in the same
/// order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhase {
    /// Tests every particle pair of every overlapping body pair.
    #[default]
    BruteForce,
    /// Bins the second body of each pair into a spatial hash.
    SpatialHash,
}

/// Body-body collision stage.
#[derive(Debug, Default)]
pub struct BodyCollision {
    broad_phase: BroadPhase,
    contacts: Vec<BodyBodyContact>,
    last_result: ContactResult,
}

fn predicted_bounds(body: &Body) -> Aabb {
    Aabb::from_points(&body.particles.predicted).inflate(body.particle_radius())
}

impl BodyCollision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broad_phase(broad_phase: BroadPhase) -> Self {
        Self {
            broad_phase,
            ..Default::default()
        }
    }

    pub fn broad_phase(&self) -> BroadPhase {
        self.broad_phase
    }

    /// Contacts found in the last [`CollisionStage::resolve`].
    pub fn contacts(&self) -> &[BodyBodyContact] {
        &self.contacts
    }

    pub fn last_result(&self) -> ContactResult {
        self.last_result
    }

    /// Finds every overlapping particle pair over all unordered body pairs.
    pub fn find_contacts(&self, bodies: &[Body]) -> Vec<BodyBodyContact> {
        let bounds: Vec<Aabb> = bodies.iter().map(predicted_bounds).collect();
        let mut contacts = Vec::new();

        for a in 0..bodies.len() {
            for b in (a + 1)..bodies.len() {
                if !bounds[a].intersects(&bounds[b]) {
                    continue;
                }
                let found = contacts.len();
                self.find_pair(bodies, a, b, &mut contacts);
                trace!(a, b, contacts = contacts.len() - found, "body pair tested");
            }
        }
        contacts
    }

    fn find_pair(&self, bodies: &[Body], a: usize, b: usize, out: &mut Vec<BodyBodyContact>) {
        let (body_a, body_b) = (&bodies[a], &bodies[b]);
        let reach = body_a.particle_radius() + body_b.particle_radius();
        let reach_sq = reach * reach;
        let pa = &body_a.particles.predicted;
        let pb = &body_b.particles.predicted;

        let mut push = |i: usize, j: u32| {
            if pa[i].distance_squared(pb[j as usize]) < reach_sq {
                out.push(BodyBodyContact {
                    body_a: BodyId(a as u32),
                    particle_a: i as u32,
                    body_b: BodyId(b as u32),
                    particle_b: j,
                });
            }
        };

        match self.broad_phase {
            BroadPhase::BruteForce => {
                for i in 0..pa.len() {
                    for j in 0..pb.len() {
                        push(i, j as u32);
                    }
                }
            }
            BroadPhase::SpatialHash => {
                let mut hash = SpatialHash::new(reach);
                hash.rebuild(pb);
                let mut candidates = Vec::new();
                for i in 0..pa.len() {
                    candidates.clear();
                    hash.query(pa[i], &mut candidates);
                    for &j in &candidates {
                        push(i, j);
                    }
                }
            }
        }
    }
}

impl CollisionStage for BodyCollision {
    fn resolve(
        &mut self,
        bodies: &mut [Body],
        ctx: &CollisionContext<'_>,
    ) -> VerdureResult<ContactSummary> {
        self.contacts = self.find_contacts(bodies);

        let di = ctx.di();
        let mut result = ContactResult::default();
        for _ in 0..ctx.iterations {
            for contact in &self.contacts {
                if let Some(separation) = contact.resolve_contact(bodies, di) {
                    result.record(separation);
                }
            }
        }
        self.last_result = result;

        Ok(ContactSummary {
            body_contacts: self.contacts.len() as u32,
            external_contacts: 0,
        })
    }

    fn name(&self) -> &str {
        "body_collision"
    }
}
