//! Position constraints.
//!
//! Constraints hold particle indices only. The owning [`Body`](crate::Body)
//! passes its [`Particles`] in when projecting, so the arrays and the
//! constraint arena can be borrowed independently.
//!
//! All projections operate on predicted positions and are scaled by `di`,
//! the reciprocal of the number of solver passes.

use serde::{Deserialize, Serialize};
use tracing::trace;
use verdure_math::{angle_between_deg, Vec3};
use verdure_types::constants::{EPSILON, STRAIGHT_ANGLE_DEG};

use crate::body::Particles;
use crate::config::BodyConfig;

/// A constraint owned by a body.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Distance(DistanceConstraint),
    Bending(BendingConstraint),
    StaticPin(StaticPin),
}

impl Constraint {
    pub fn project_positions(&mut self, particles: &mut Particles, di: f64) {
        match self {
            Constraint::Distance(c) => c.project_positions(particles, di),
            Constraint::Bending(c) => c.project_positions(particles, di),
            Constraint::StaticPin(c) => c.project_positions(particles),
        }
    }

    /// Only pins act on velocities.
    pub fn project_velocities(&self, particles: &mut Particles) {
        if let Constraint::StaticPin(pin) = self {
            pin.project_velocities(particles);
        }
    }

    /// Particle indices this constraint touches.
    pub fn indices(&self) -> &[usize] {
        match self {
            Constraint::Distance(c) => &c.particles,
            Constraint::Bending(c) => &c.particles,
            Constraint::StaticPin(c) => std::slice::from_ref(&c.particle),
        }
    }

    pub fn as_distance(&self) -> Option<&DistanceConstraint> {
        match self {
            Constraint::Distance(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_bending(&self) -> Option<&BendingConstraint> {
        match self {
            Constraint::Bending(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_bending_mut(&mut self) -> Option<&mut BendingConstraint> {
        match self {
            Constraint::Bending(c) => Some(c),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::Distance(_) => "distance",
            Constraint::Bending(_) => "bending",
            Constraint::StaticPin(_) => "static_pin",
        }
    }
}

// ─── Distance ─────────────────────────────────────────────────

/// Keeps two particles at their construction distance.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceConstraint {
    pub particles: [usize; 2],
    pub rest_length: f64,
    /// In `[0, 1]`.
    pub stiffness: f64,
}

impl DistanceConstraint {
    pub fn new(positions: &[Vec3], i0: usize, i1: usize, stiffness: f64) -> Self {
        Self {
            particles: [i0, i1],
            rest_length: positions[i0].distance(positions[i1]),
            stiffness,
        }
    }

    /// Current length on predicted positions.
    pub fn length(&self, particles: &Particles) -> f64 {
        let [i0, i1] = self.particles;
        particles.predicted[i0].distance(particles.predicted[i1])
    }

    /// Moves both ends along their separation by the mass-weighted share of
    /// `stiffness * (d - rest)`. Static ends do not move.
    ///
    /// The correction is divided by `w0 + w1`, so stiffness 1.0 reaches the
    /// rest length in a single projection.
    pub fn project_positions(&self, particles: &mut Particles, di: f64) {
        let [i0, i1] = self.particles;
        let w0 = particles.inv_mass(i0);
        let w1 = particles.inv_mass(i1);
        let w = w0 + w1;
        if w <= 0.0 {
            return;
        }

        let n = particles.predicted[i1] - particles.predicted[i0];
        let d = n.length();
        if d < EPSILON {
            trace!(i0, i1, "coincident particles, distance correction skipped");
            return;
        }

        let corr = (self.stiffness * (d - self.rest_length) / w) * (n / d);
        particles.predicted[i0] += corr * (w0 * di);
        particles.predicted[i1] -= corr * (w1 * di);
    }
}

// ─── Bending ──────────────────────────────────────────────────

/// Lattice direction a bending triple runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BendAxis {
    Vertical,
    Horizontal,
}

/// Lifecycle parameters shared by every bending constraint of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BendingParams {
    pub stiffness: f64,
    pub breaking_threshold_angle: f64,
    pub degradation_threshold_angle: f64,
    pub recuperation_time: f64,
    pub step_stiffness: f64,
    pub growing_time: f64,
}

impl From<&BodyConfig> for BendingParams {
    fn from(config: &BodyConfig) -> Self {
        Self {
            stiffness: config.bend_stiffness,
            breaking_threshold_angle: config.breaking_threshold_angle,
            degradation_threshold_angle: config.degradation_threshold_angle,
            recuperation_time: config.recuperation_time,
            step_stiffness: config.step_stiffness,
            growing_time: config.growing_time,
        }
    }
}

/// Three-particle bending constraint around a hinge `particles[1]`.
///
/// The projection pulls `particles[2]` toward the rest distance from the
/// triple's centroid, distributing the correction 1:1:2. The hinge angle
/// measured during projection drives breakage and contact degradation.
#[derive(Debug, Clone, PartialEq)]
pub struct BendingConstraint {
    pub particles: [usize; 3],
    pub axis: BendAxis,
    rest_length: f64,

    stiffness: f64,
    current_stiffness: f64,
    min_stiffness: f64,
    max_stiffness: f64,

    breaking_threshold_angle: f64,
    degradation_threshold_angle: f64,
    recuperation_time: f64,
    step_stiffness: f64,
    growing_time: f64,

    /// Degrees, as of the last projection.
    current_angle: f64,
    stepped_this_contact: bool,
    min_recorded_this_contact: bool,
    broken_time: f64,
}

impl BendingConstraint {
    pub fn new(
        positions: &[Vec3],
        particles: [usize; 3],
        axis: BendAxis,
        params: &BendingParams,
    ) -> Self {
        let [i0, i1, i2] = particles;
        let (p0, p1, p2) = (positions[i0], positions[i1], positions[i2]);
        let center = (p0 + p1 + p2) / 3.0;

        Self {
            particles,
            axis,
            rest_length: (p2 - center).length(),
            stiffness: params.stiffness,
            current_stiffness: params.stiffness,
            min_stiffness: params.stiffness,
            max_stiffness: params.stiffness,
            breaking_threshold_angle: params.breaking_threshold_angle,
            degradation_threshold_angle: params.degradation_threshold_angle,
            recuperation_time: params.recuperation_time,
            step_stiffness: params.step_stiffness,
            growing_time: params.growing_time,
            current_angle: angle_between_deg(p0 - p1, p2 - p1).unwrap_or(STRAIGHT_ANGLE_DEG),
            stepped_this_contact: false,
            min_recorded_this_contact: false,
            broken_time: 0.0,
        }
    }

    pub fn project_positions(&mut self, particles: &mut Particles, di: f64) {
        self.current_stiffness = self.stiffness;

        let [i0, i1, i2] = self.particles;
        let (p0, p1, p2) = (
            particles.predicted[i0],
            particles.predicted[i1],
            particles.predicted[i2],
        );

        if let Some(angle) = angle_between_deg(p0 - p1, p2 - p1) {
            self.current_angle = angle;
        }

        let center = (p0 + p1 + p2) / 3.0;
        let dir = p2 - center;
        let dist = dir.length();
        if dist < EPSILON {
            trace!(i0, i1, i2, "collapsed bending triple, correction skipped");
            return;
        }

        let force = dir * (1.0 - self.rest_length / dist);
        let s = self.stiffness * di;
        particles.predicted[i0] += force * (0.5 * s);
        particles.predicted[i1] += force * (0.5 * s);
        particles.predicted[i2] -= force * s;
    }

    /// How far the hinge is from straight, in degrees.
    #[inline]
    pub fn excess_angle(&self) -> f64 {
        STRAIGHT_ANGLE_DEG - self.current_angle
    }

    #[inline]
    pub fn should_break(&self) -> bool {
        self.excess_angle() > self.breaking_threshold_angle
    }

    pub(crate) fn mark_broken(&mut self) {
        self.stiffness = 0.0;
        self.current_stiffness = 0.0;
        self.broken_time = 0.0;
        self.stepped_this_contact = false;
        self.min_recorded_this_contact = false;
    }

    /// Accumulates time spent broken; true once the growing time has passed.
    pub(crate) fn advance_broken_time(&mut self, dt: f64) -> bool {
        self.broken_time += dt;
        self.broken_time >= self.growing_time
    }

    /// Contact-driven stiffness update, run once per step.
    ///
    /// While the first particle is in contact and the hinge is bent past the
    /// degradation angle, stiffness drops by one step per contact episode.
    /// Out of contact it regrows toward the maximum over `recuperation_time`.
    pub fn degrade_under_contact(&mut self, in_contact: bool, dt: f64) {
        let bent = self.excess_angle() > self.degradation_threshold_angle;

        if bent && in_contact && !self.min_recorded_this_contact {
            self.min_stiffness = self.stiffness;
            self.min_recorded_this_contact = true;
        }

        if bent && in_contact && !self.stepped_this_contact {
            if self.stiffness >= self.step_stiffness {
                self.stiffness -= self.step_stiffness;
                self.min_stiffness = self.min_stiffness.min(self.stiffness);
            }
            self.stepped_this_contact = true;
        }

        if !in_contact {
            self.stepped_this_contact = false;
            self.min_recorded_this_contact = false;

            if self.stiffness < self.max_stiffness {
                if self.recuperation_time <= 0.0 {
                    self.stiffness = self.max_stiffness;
                } else {
                    let rate = (self.max_stiffness - self.stiffness) / self.recuperation_time;
                    self.stiffness += rate * dt;
                }
            }
        }

        self.stiffness = self.stiffness.clamp(0.0, self.max_stiffness);
    }

    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Stiffness as of the last projection.
    pub fn current_stiffness(&self) -> f64 {
        self.current_stiffness
    }

    /// Lowest stiffness seen during the current contact episode.
    pub fn min_stiffness(&self) -> f64 {
        self.min_stiffness
    }

    pub fn max_stiffness(&self) -> f64 {
        self.max_stiffness
    }

    pub fn current_angle(&self) -> f64 {
        self.current_angle
    }

    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    pub fn broken_time(&self) -> f64 {
        self.broken_time
    }

    pub fn growing_time(&self) -> f64 {
        self.growing_time
    }
}

// ─── Static pin ───────────────────────────────────────────────

/// Holds one particle at the position it had when it was pinned.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticPin {
    pub particle: usize,
    pub pinned: Vec3,
}

impl StaticPin {
    pub fn new(positions: &[Vec3], particle: usize) -> Self {
        Self {
            particle,
            pinned: positions[particle],
        }
    }

    #[inline]
    pub fn project_positions(&self, particles: &mut Particles) {
        particles.predicted[self.particle] = self.pinned;
    }

    #[inline]
    pub fn project_velocities(&self, particles: &mut Particles) {
        particles.velocities[self.particle] = Vec3::ZERO;
    }
}
