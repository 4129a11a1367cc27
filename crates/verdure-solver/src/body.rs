//! Particle bodies.
//!
//! A [`Body`] owns its particle arrays ([`Particles`]) and an arena of
//! constraints addressed by [`ConstraintId`]. Index lists over the arena
//! describe each constraint's lifecycle:
//!
//! - `live`: projected every pass, in list order
//! - `bending`: the live bending constraints (breakable)
//! - `broken`: broken bending constraints, oldest first
//! - `statics`: pins, projected after every live constraint
//!
//! The particle count is fixed for the lifetime of the body.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use verdure_math::{Aabb, Vec3};
use verdure_types::constants::RECOVERY_RATIO_THRESHOLD;
use verdure_types::{ConstraintId, ExternalBodyId, VerdureError, VerdureResult};

use crate::constraint::{
    BendAxis, BendingConstraint, BendingParams, Constraint, DistanceConstraint, StaticPin,
};

/// Contact data written by the host collision system for one particle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Direction the particle is pushed out along. Need not be normalized.
    pub normal: Vec3,
    pub point: Vec3,
    /// External body that was hit, if the host knows it.
    pub body: Option<ExternalBodyId>,
}

/// Per-particle state of a body, stored as parallel arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Particles {
    pub positions: Vec<Vec3>,
    pub predicted: Vec<Vec3>,
    pub velocities: Vec<Vec3>,

    pub is_static: Vec<bool>,
    /// Set on the hinge particle of a broken bending constraint.
    pub is_broken: Vec<bool>,

    // ─── Host contact input ───
    pub is_contact: Vec<bool>,
    pub external_hit: Vec<ContactInfo>,
    pub penetration_distance: Vec<f64>,

    pub radius: f64,
    pub mass: f64,
}

impl Particles {
    fn new(positions: Vec<Vec3>, radius: f64, mass: f64) -> Self {
        let n = positions.len();
        Self {
            predicted: positions.clone(),
            positions,
            velocities: vec![Vec3::ZERO; n],
            is_static: vec![false; n],
            is_broken: vec![false; n],
            is_contact: vec![false; n],
            external_hit: vec![ContactInfo::default(); n],
            penetration_distance: vec![0.0; n],
            radius,
            mass,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Inverse mass, zero for static particles.
    #[inline]
    pub fn inv_mass(&self, i: usize) -> f64 {
        if self.is_static[i] {
            0.0
        } else {
            1.0 / self.mass
        }
    }
}

/// A deformable body simulated as particles and constraints.
#[derive(Debug, Clone)]
pub struct Body {
    pub particles: Particles,
    positions_rest: Vec<Vec3>,

    /// Velocity damping rate (1/s).
    pub damping: f64,
    /// Positions' bounding box inflated by the particle radius.
    pub bounds: Aabb,
    /// Region last passed to [`Body::mark_static`].
    pub static_bounds: Aabb,

    constraints: Vec<Constraint>,
    live: Vec<ConstraintId>,
    bending: Vec<ConstraintId>,
    broken: VecDeque<ConstraintId>,
    statics: Vec<ConstraintId>,
    bending_total: usize,
}

impl Body {
    /// Creates a body of `count` particles at the origin.
    pub fn new(count: usize, radius: f64, mass: f64) -> VerdureResult<Self> {
        Self::from_positions(vec![Vec3::ZERO; count], radius, mass)
    }

    /// Creates a body whose current and rest positions are `positions`.
    pub fn from_positions(positions: Vec<Vec3>, radius: f64, mass: f64) -> VerdureResult<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(VerdureError::InvalidArgument(format!(
                "Particle radius must be positive, got {radius}"
            )));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(VerdureError::InvalidArgument(format!(
                "Particle mass must be positive, got {mass}"
            )));
        }

        let mut body = Self {
            positions_rest: positions.clone(),
            particles: Particles::new(positions, radius, mass),
            damping: 1.0,
            bounds: Aabb::empty(),
            static_bounds: Aabb::empty(),
            constraints: Vec::new(),
            live: Vec::new(),
            bending: Vec::new(),
            broken: VecDeque::new(),
            statics: Vec::new(),
            bending_total: 0,
        };
        body.update_bounds();
        Ok(body)
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn particle_radius(&self) -> f64 {
        self.particles.radius
    }

    #[inline]
    pub fn particle_mass(&self) -> f64 {
        self.particles.mass
    }

    /// Positions at construction time.
    pub fn positions_rest(&self) -> &[Vec3] {
        &self.positions_rest
    }

    // ─── Constraint registration ──────────────────────────────

    fn check_indices(&self, indices: &[usize]) -> VerdureResult<()> {
        let n = self.particle_count();
        match indices.iter().find(|&&i| i >= n) {
            Some(i) => Err(VerdureError::InvalidArgument(format!(
                "Particle index {i} out of range for body with {n} particles"
            ))),
            None => Ok(()),
        }
    }

    /// Adds a constraint to the arena and activates it.
    ///
    /// Pins go to the static list and mark their particle static; bending
    /// constraints join both the live and bending lists.
    pub fn add_constraint(&mut self, constraint: Constraint) -> VerdureResult<ConstraintId> {
        self.check_indices(constraint.indices())?;

        let id = ConstraintId(self.constraints.len() as u32);
        match &constraint {
            Constraint::StaticPin(pin) => {
                self.particles.is_static[pin.particle] = true;
                self.statics.push(id);
            }
            Constraint::Bending(_) => {
                self.live.push(id);
                self.bending.push(id);
                self.bending_total += 1;
            }
            Constraint::Distance(_) => self.live.push(id),
        }
        self.constraints.push(constraint);
        Ok(id)
    }

    /// Adds a distance constraint whose rest length is the current separation.
    pub fn add_distance_constraint(
        &mut self,
        i0: usize,
        i1: usize,
        stiffness: f64,
    ) -> VerdureResult<ConstraintId> {
        self.check_indices(&[i0, i1])?;
        let c = DistanceConstraint::new(&self.particles.positions, i0, i1, stiffness);
        self.add_constraint(Constraint::Distance(c))
    }

    /// Adds a bending constraint measured on the current positions.
    pub fn add_bending_constraint(
        &mut self,
        particles: [usize; 3],
        axis: BendAxis,
        params: &BendingParams,
    ) -> VerdureResult<ConstraintId> {
        self.check_indices(&particles)?;
        let c = BendingConstraint::new(&self.particles.positions, particles, axis, params);
        self.add_constraint(Constraint::Bending(c))
    }

    /// Pins every particle inside `region` (inclusive). Returns how many
    /// particles were newly pinned; already static particles are skipped.
    pub fn mark_static(&mut self, region: &Aabb) -> usize {
        self.static_bounds = *region;

        let candidates: Vec<usize> = (0..self.particle_count())
            .filter(|&i| !self.particles.is_static[i] && region.contains(self.particles.positions[i]))
            .collect();

        for &i in &candidates {
            let pin = StaticPin::new(&self.particles.positions, i);
            let id = ConstraintId(self.constraints.len() as u32);
            self.particles.is_static[i] = true;
            self.constraints.push(Constraint::StaticPin(pin));
            self.statics.push(id);
        }

        if !candidates.is_empty() {
            debug!(pinned = candidates.len(), "marked particles static");
        }
        candidates.len()
    }

    // ─── Queries ──────────────────────────────────────────────

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id.index())
    }

    /// Every constraint ever added, including broken ones and pins.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn live_constraints(&self) -> &[ConstraintId] {
        &self.live
    }

    pub fn bending_constraints(&self) -> &[ConstraintId] {
        &self.bending
    }

    /// Broken bending constraints, oldest first.
    pub fn broken_constraints(&self) -> &VecDeque<ConstraintId> {
        &self.broken
    }

    pub fn static_constraints(&self) -> &[ConstraintId] {
        &self.statics
    }

    /// Number of bending constraints ever created.
    pub fn total_bending_count(&self) -> usize {
        self.bending_total
    }

    /// Sum of current stiffness over live bending constraints.
    pub fn aggregate_bending_stiffness(&self) -> f64 {
        self.bending
            .iter()
            .filter_map(|id| self.constraints[id.index()].as_bending())
            .map(BendingConstraint::current_stiffness)
            .sum()
    }

    /// Sum over live bending constraints of current stiffness relative to
    /// its maximum. Each fully grown constraint contributes 1.0; one with
    /// zero maximum stiffness counts as fully grown.
    pub fn normalized_bending_stiffness(&self) -> f64 {
        self.bending
            .iter()
            .filter_map(|id| self.constraints[id.index()].as_bending())
            .map(|bend| {
                if bend.max_stiffness() > 0.0 {
                    bend.current_stiffness() / bend.max_stiffness()
                } else {
                    1.0
                }
            })
            .sum()
    }

    /// Fraction of bending constraints still live. 1.0 when there are none.
    pub fn living_ratio(&self) -> f64 {
        if self.bending_total == 0 {
            1.0
        } else {
            self.bending.len() as f64 / self.bending_total as f64
        }
    }

    /// Kinetic energy of the free particles: 0.5 * m * Σ|v|².
    pub fn kinetic_energy(&self) -> f64 {
        let p = &self.particles;
        let sum: f64 = p
            .velocities
            .iter()
            .zip(&p.is_static)
            .filter(|(_, &fixed)| !fixed)
            .map(|(v, _)| v.length_squared())
            .sum();
        0.5 * p.mass * sum
    }

    /// Index of the first particle with a non-finite position or velocity.
    pub fn first_non_finite(&self) -> Option<usize> {
        let p = &self.particles;
        (0..p.len()).find(|&i| !p.positions[i].is_finite() || !p.velocities[i].is_finite())
    }

    // ─── Host contact input ───────────────────────────────────

    fn check_particle(&self, i: usize) -> VerdureResult<()> {
        self.check_indices(std::slice::from_ref(&i))
    }

    pub fn set_contact(&mut self, i: usize, hit: ContactInfo, penetration: f64) -> VerdureResult<()> {
        self.check_particle(i)?;
        self.particles.is_contact[i] = true;
        self.particles.external_hit[i] = hit;
        self.particles.penetration_distance[i] = penetration;
        Ok(())
    }

    pub fn clear_contact(&mut self, i: usize) -> VerdureResult<()> {
        self.check_particle(i)?;
        self.particles.is_contact[i] = false;
        self.particles.external_hit[i] = ContactInfo::default();
        self.particles.penetration_distance[i] = 0.0;
        Ok(())
    }

    pub fn clear_contacts(&mut self) {
        let p = &mut self.particles;
        p.is_contact.fill(false);
        p.external_hit.fill(ContactInfo::default());
        p.penetration_distance.fill(0.0);
    }

    // ─── Per-step phases ──────────────────────────────────────

    /// `v -= v * damping * dt` on free particles.
    pub fn apply_damping(&mut self, dt: f64) {
        let factor = self.damping * dt;
        let p = &mut self.particles;
        for (v, &fixed) in p.velocities.iter_mut().zip(&p.is_static) {
            if !fixed {
                *v -= *v * factor;
            }
        }
    }

    /// `v += accel * dt` on free particles.
    pub fn apply_acceleration(&mut self, accel: Vec3, dt: f64) {
        let p = &mut self.particles;
        for (v, &fixed) in p.velocities.iter_mut().zip(&p.is_static) {
            if !fixed {
                *v += accel * dt;
            }
        }
    }

    /// Explicit position estimate. Static particles stay put.
    pub fn predict(&mut self, dt: f64) {
        let p = &mut self.particles;
        for i in 0..p.len() {
            p.predicted[i] = if p.is_static[i] {
                p.positions[i]
            } else {
                p.positions[i] + p.velocities[i] * dt
            };
        }
    }

    /// Projects every live constraint in list order, then every pin.
    pub fn constrain_positions(&mut self, di: f64) {
        let Self {
            particles,
            constraints,
            live,
            statics,
            ..
        } = self;
        for id in live.iter().chain(statics.iter()) {
            constraints[id.index()].project_positions(particles, di);
        }
    }

    pub fn constrain_velocities(&mut self) {
        let Self {
            particles,
            constraints,
            live,
            statics,
            ..
        } = self;
        for id in live.iter().chain(statics.iter()) {
            constraints[id.index()].project_velocities(particles);
        }
    }

    /// Derives velocities from the position change, puts slow particles to
    /// sleep and accepts the predicted positions.
    pub fn integrate(&mut self, dt: f64, sleep_threshold: f64) {
        let inv_dt = 1.0 / dt;
        let sleep_sq = (sleep_threshold * dt) * (sleep_threshold * dt);
        let p = &mut self.particles;
        for i in 0..p.len() {
            let v = (p.predicted[i] - p.positions[i]) * inv_dt;
            p.velocities[i] = if v.length_squared() < sleep_sq {
                Vec3::ZERO
            } else {
                v
            };
            p.positions[i] = p.predicted[i];
        }
    }

    /// Recomputes `bounds` from the current positions.
    pub fn update_bounds(&mut self) {
        self.bounds = Aabb::from_points(&self.particles.positions).inflate(self.particles.radius);
    }

    /// Adds uniform jitter in `[-amount, amount]` to every position.
    pub fn randomize_positions<R: Rng + ?Sized>(&mut self, rng: &mut R, amount: f64) {
        for p in &mut self.particles.positions {
            let jitter = Vec3::new(
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            );
            *p += jitter * amount;
        }
    }

    /// Shuffles the projection order of the live constraints.
    pub fn randomize_constraint_order<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.live.shuffle(rng);
    }

    // ─── Breakage & recovery ──────────────────────────────────

    /// Breaks a live bending constraint if its hinge is bent past the
    /// breaking angle. Returns whether it broke.
    pub fn try_break(&mut self, id: ConstraintId) -> bool {
        let Some(slot) = self.bending.iter().position(|&b| b == id) else {
            return false;
        };
        let Some(bend) = self.constraints.get_mut(id.index()).and_then(Constraint::as_bending_mut) else {
            return false;
        };
        if !bend.should_break() {
            return false;
        }

        let angle = bend.current_angle();
        let hinge = bend.particles[1];
        bend.mark_broken();

        self.bending.remove(slot);
        self.live.retain(|&c| c != id);
        self.broken.push_back(id);
        self.particles.is_broken[hinge] = true;

        debug!(constraint = id.0, hinge, angle, "bending constraint broke");
        true
    }

    /// Runs [`Body::try_break`] over every live bending constraint.
    pub fn break_pass(&mut self) -> Vec<ConstraintId> {
        let candidates = self.bending.clone();
        candidates
            .into_iter()
            .filter(|&id| self.try_break(id))
            .collect()
    }

    /// Contact degradation and regrowth for every live bending constraint.
    /// Contact is read from the constraint's first particle.
    pub fn degrade_pass(&mut self, dt: f64) {
        let Self {
            particles,
            constraints,
            bending,
            ..
        } = self;
        for id in bending.iter() {
            if let Some(bend) = constraints[id.index()].as_bending_mut() {
                let in_contact = particles.is_contact[bend.particles[0]];
                bend.degrade_under_contact(in_contact, dt);
            }
        }
    }

    /// Considers the oldest broken constraint for recovery.
    ///
    /// `aggregate` is the body's summed bending stiffness, normalized per
    /// constraint (see [`Body::normalized_bending_stiffness`]). The constraint
    /// returns once it has been broken for its growing time and the live
    /// constraints average above the recovery ratio. It comes back with zero
    /// stiffness and regrows through [`Body::degrade_pass`].
    pub fn try_recover(&mut self, aggregate: f64, dt: f64) -> Option<ConstraintId> {
        let id = *self.broken.front()?;
        let ready = match self.constraints[id.index()].as_bending_mut() {
            Some(bend) => bend.advance_broken_time(dt),
            None => true,
        };
        if !ready {
            return None;
        }

        let live = self.bending.len();
        let ratio = if live == 0 {
            f64::INFINITY
        } else {
            aggregate / live as f64
        };
        if ratio > RECOVERY_RATIO_THRESHOLD && self.restore_constraint(id) {
            Some(id)
        } else {
            None
        }
    }

    /// Moves a broken constraint back to the live lists. No-op (returns
    /// false) for ids that are not broken.
    pub fn restore_constraint(&mut self, id: ConstraintId) -> bool {
        let Some(slot) = self.broken.iter().position(|&b| b == id) else {
            return false;
        };
        self.broken.remove(slot);

        let constraint = &self.constraints[id.index()];
        if let Some(bend) = constraint.as_bending() {
            self.particles.is_broken[bend.particles[1]] = false;
            self.bending.push(id);
        }
        self.live.push(id);

        debug!(constraint = id.0, "bending constraint recovered");
        true
    }
}
