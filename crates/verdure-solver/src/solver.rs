//! The position-based dynamics step loop.

use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use verdure_math::Vec3;
use verdure_telemetry::{EventBus, EventKind, SimulationEvent};
use verdure_types::{BodyId, ExternalBodyId, VerdureError, VerdureResult};

use crate::body::Body;
use crate::collision::{CollisionContext, CollisionStage, ContactSummary, ExternalBody};
use crate::config::SolverConfig;
use crate::force::ExternalForce;

/// Result of one solver step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Index of the step just taken.
    pub timestep: u64,
    /// Projection passes performed.
    pub iterations: u32,
    pub body_contacts: u32,
    pub external_contacts: u32,
    /// Bending constraints broken this step.
    pub broken: u32,
    /// Bending constraints recovered this step.
    pub recovered: u32,
    /// Wall-clock time for this step (seconds).
    pub wall_time: f64,
}

/// Runs a per-body phase, across threads when `parallel` is enabled.
/// Bodies never share particles, so phases need no synchronization.
fn for_each_body<F>(bodies: &mut [Body], f: F)
where
    F: Fn(&mut Body) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    bodies.par_iter_mut().for_each(f);
    #[cfg(not(feature = "parallel"))]
    bodies.iter_mut().for_each(f);
}

/// Owns the bodies and advances them in lockstep.
///
/// Each step runs forces, prediction, constraint projection, collision
/// stages, breakage/degradation/recovery and integration, in that order.
pub struct Solver {
    config: SolverConfig,
    bodies: Vec<Body>,
    external_bodies: Vec<ExternalBody>,
    forces: Vec<ExternalForce>,
    collisions: Vec<Box<dyn CollisionStage>>,
    telemetry: Option<EventBus>,
    timestep: u64,
    sim_time: f64,
}

impl Solver {
    /// Creates a solver. Registers gravity when `apply_gravity` is set.
    pub fn new(config: SolverConfig) -> VerdureResult<Self> {
        config.validate()?;
        let mut forces = Vec::new();
        if config.apply_gravity {
            forces.push(ExternalForce::Gravity(Vec3::from_array(config.gravity)));
        }
        Ok(Self {
            config,
            bodies: Vec::new(),
            external_bodies: Vec::new(),
            forces,
            collisions: Vec::new(),
            telemetry: None,
            timestep: 0,
            sim_time: 0.0,
        })
    }

    /// Attaches an event bus, flushed at the end of every step.
    pub fn with_telemetry(mut self, bus: EventBus) -> Self {
        self.telemetry = Some(bus);
        self
    }

    pub fn telemetry_mut(&mut self) -> Option<&mut EventBus> {
        self.telemetry.as_mut()
    }

    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        self.bodies.push(body);
        id
    }

    pub fn add_external_body(&mut self, body: ExternalBody) -> ExternalBodyId {
        let id = ExternalBodyId(self.external_bodies.len() as u32);
        self.external_bodies.push(body);
        id
    }

    /// Registers a force. Adding an identical force twice is a no-op.
    pub fn add_force(&mut self, force: ExternalForce) {
        if !self.forces.contains(&force) {
            self.forces.push(force);
        }
    }

    pub fn add_collision(&mut self, stage: Box<dyn CollisionStage>) {
        debug!(stage = stage.name(), "collision stage registered");
        self.collisions.push(stage);
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.index())
    }

    pub fn external_bodies(&self) -> &[ExternalBody] {
        &self.external_bodies
    }

    pub fn external_body_mut(&mut self, id: ExternalBodyId) -> Option<&mut ExternalBody> {
        self.external_bodies.get_mut(id.index())
    }

    pub fn forces(&self) -> &[ExternalForce] {
        &self.forces
    }

    pub fn collision_stage_names(&self) -> Vec<&str> {
        self.collisions.iter().map(|s| s.name()).collect()
    }

    /// Steps taken so far.
    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// Simulated seconds so far.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    fn emit(&self, kind: EventKind) {
        if let Some(bus) = &self.telemetry {
            bus.emit(SimulationEvent::new(self.timestep, kind));
        }
    }

    /// Rejects host contact flags naming an external body that was never
    /// registered. Runs before any phase so a failed step mutates nothing.
    fn check_contact_input(&self) -> VerdureResult<()> {
        let known = self.external_bodies.len();
        for (b, body) in self.bodies.iter().enumerate() {
            let p = &body.particles;
            for i in 0..p.len() {
                if !p.is_contact[i] || p.is_static[i] {
                    continue;
                }
                if let Some(id) = p.external_hit[i].body.filter(|id| id.index() >= known) {
                    warn!(
                        body = b,
                        particle = i,
                        external = id.0,
                        "contact names unknown external body"
                    );
                    return Err(VerdureError::InconsistentState(format!(
                        "Body {b} particle {i} hit unknown external body {}",
                        id.0
                    )));
                }
            }
        }
        Ok(())
    }

    /// Advances every body by `dt` seconds.
    ///
    /// `dt == 0` does nothing. Negative or non-finite `dt` is rejected, as are
    /// contact flags naming an unregistered external body; both leave the
    /// bodies untouched. A non-finite particle state after the step is
    /// reported as `InvariantViolation`.
    pub fn step(&mut self, dt: f64) -> VerdureResult<StepReport> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(VerdureError::InvalidArgument(format!(
                "Timestep must be finite and non-negative, got {dt}"
            )));
        }
        if dt == 0.0 {
            return Ok(StepReport {
                timestep: self.timestep,
                ..Default::default()
            });
        }

        self.check_contact_input()?;

        let start = Instant::now();
        self.emit(EventKind::TimestepBegin {
            sim_time: self.sim_time,
            dt,
        });

        // 1. Forces
        let forces = &self.forces;
        for_each_body(&mut self.bodies, |body| {
            body.apply_damping(dt);
            for force in forces {
                force.apply(body, dt);
            }
        });

        // 2. Predict
        for_each_body(&mut self.bodies, |body| body.predict(dt));

        // 3. Project
        let iterations = self.config.solver_iterations;
        let di = 1.0 / iterations as f64;
        for_each_body(&mut self.bodies, |body| {
            for _ in 0..iterations {
                body.constrain_positions(di);
            }
        });

        // 4. Collisions
        for_each_body(&mut self.bodies, Body::update_bounds);
        let ctx = CollisionContext {
            dt,
            iterations: self.config.collision_iterations,
            use_penetration_distance: self.config.use_penetration_distance,
            fixed_step: self.config.collision_fixed_step,
            external_bodies: &self.external_bodies,
        };
        let mut contacts = ContactSummary::default();
        for stage in &mut self.collisions {
            contacts += stage.resolve(&mut self.bodies, &ctx)?;
        }

        // 5. Breakage, degradation, recovery
        let mut broken = Vec::new();
        let mut recovered = Vec::new();
        for (index, body) in self.bodies.iter_mut().enumerate() {
            let id = BodyId(index as u32);
            broken.extend(body.break_pass().into_iter().map(|c| (id, c)));
            body.degrade_pass(dt);
            if self.config.activate_regeneration {
                let aggregate = body.normalized_bending_stiffness();
                if let Some(c) = body.try_recover(aggregate, dt) {
                    recovered.push((id, c));
                }
            }
        }

        // 6. Integrate
        let sleep_threshold = self.config.sleep_threshold;
        for_each_body(&mut self.bodies, |body| {
            body.integrate(dt, sleep_threshold);
            body.constrain_velocities();
            body.update_bounds();
        });

        // 7. Sanity
        for (index, body) in self.bodies.iter().enumerate() {
            if let Some(particle) = body.first_non_finite() {
                warn!(body = index, particle, timestep = self.timestep, "non-finite particle state");
                return Err(VerdureError::InvariantViolation(format!(
                    "Body {index} particle {particle} is not finite at timestep {}",
                    self.timestep
                )));
            }
        }

        if self.telemetry.is_some() {
            self.emit(EventKind::ContactDetection {
                body_contacts: contacts.body_contacts,
                external_contacts: contacts.external_contacts,
            });
            for &(body, constraint) in &broken {
                self.emit(EventKind::ConstraintBroken { body, constraint });
            }
            for &(body, constraint) in &recovered {
                self.emit(EventKind::ConstraintRecovered { body, constraint });
            }
            for (index, body) in self.bodies.iter().enumerate() {
                self.emit(EventKind::Stiffness {
                    body: BodyId(index as u32),
                    aggregate: body.aggregate_bending_stiffness(),
                    living_ratio: body.living_ratio(),
                });
            }
        }

        let wall_time = start.elapsed().as_secs_f64();
        self.emit(EventKind::TimestepEnd { wall_time });
        if let Some(bus) = self.telemetry.as_mut() {
            bus.flush();
        }

        let report = StepReport {
            timestep: self.timestep,
            iterations,
            body_contacts: contacts.body_contacts,
            external_contacts: contacts.external_contacts,
            broken: broken.len() as u32,
            recovered: recovered.len() as u32,
            wall_time,
        };
        self.timestep += 1;
        self.sim_time += dt;
        Ok(report)
    }
}
