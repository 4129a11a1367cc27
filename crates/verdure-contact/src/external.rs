//! Contacts between particles and host-owned rigid bodies.
//!
//! Detection is done by the host: it sets `is_contact`, the hit normal and
//! the penetration depth on each particle before the step. This stage only
//! turns those flags into records and pushes the particles out.

use serde::{Deserialize, Serialize};
use verdure_solver::{Body, CollisionContext, CollisionStage, ContactSummary, ExternalBody};
use verdure_types::{BodyId, ExternalBodyId, VerdureError, VerdureResult};

use crate::contact::BodyExternalContact;
use crate::response::ContactResult;

/// How far a contacted particle is pushed per resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactPolicy {
    /// A fixed distance along the normal (meters), scaled by `di`.
    FixedStep(f64),
    /// `penetration * dt` along the normal, scaled by `di`.
    PenetrationDistance,
}

impl ContactPolicy {
    pub fn from_context(ctx: &CollisionContext<'_>) -> Self {
        if ctx.use_penetration_distance {
            ContactPolicy::PenetrationDistance
        } else {
            ContactPolicy::FixedStep(ctx.fixed_step)
        }
    }
}

/// External contact stage.
#[derive(Debug, Default)]
pub struct ExternalCollision {
    contacts: Vec<BodyExternalContact>,
    last_result: ContactResult,
}

impl ExternalCollision {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contacts found in the last [`CollisionStage::resolve`].
    pub fn contacts(&self) -> &[BodyExternalContact] {
        &self.contacts
    }

    pub fn last_result(&self) -> ContactResult {
        self.last_result
    }

    /// One record per free particle flagged in contact. The rigid body comes
    /// from the hit info, or defaults to the first registered external body.
    pub fn find_external_contacts(
        &self,
        bodies: &[Body],
        external_bodies: &[ExternalBody],
    ) -> VerdureResult<Vec<BodyExternalContact>> {
        let fallback = (!external_bodies.is_empty()).then_some(ExternalBodyId(0));
        let mut contacts = Vec::new();

        for (b, body) in bodies.iter().enumerate() {
            let p = &body.particles;
            for i in 0..p.len() {
                if !p.is_contact[i] || p.is_static[i] {
                    continue;
                }
                let external = match p.external_hit[i].body {
                    Some(id) if id.index() >= external_bodies.len() => {
                        return Err(VerdureError::InconsistentState(format!(
                            "Body {b} particle {i} hit unknown external body {}",
                            id.0
                        )));
                    }
                    Some(id) => Some(id),
                    None => fallback,
                };
                contacts.push(BodyExternalContact {
                    body: BodyId(b as u32),
                    particle: i as u32,
                    external,
                });
            }
        }
        Ok(contacts)
    }
}

impl CollisionStage for ExternalCollision {
    fn resolve(
        &mut self,
        bodies: &mut [Body],
        ctx: &CollisionContext<'_>,
    ) -> VerdureResult<ContactSummary> {
        self.contacts = self.find_external_contacts(bodies, ctx.external_bodies)?;

        let di = ctx.di();
        let policy = ContactPolicy::from_context(ctx);
        let mut result = ContactResult::default();
        for _ in 0..ctx.iterations {
            for contact in &self.contacts {
                if let Some(step) = contact.resolve_contact_external(bodies, di, policy, ctx.dt) {
                    result.record(step);
                }
            }
        }
        self.last_result = result;

        Ok(ContactSummary {
            body_contacts: 0,
            external_contacts: self.contacts.len() as u32,
        })
    }

    fn name(&self) -> &str {
        "external_collision"
    }
}
