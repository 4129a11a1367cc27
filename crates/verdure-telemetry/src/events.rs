//! Simulation event types.
//!
//! Events are lightweight value types emitted by the solver during a step.
//! Each carries only what a monitor needs to follow the lifecycle of a body.

use serde::{Deserialize, Serialize};
use verdure_types::{BodyId, ConstraintId};

/// A simulation event tagged with the timestep it was emitted in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Timestep number (0-indexed).
    pub timestep: u64,
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    TimestepBegin {
        /// Simulation time at the start of the step (seconds).
        sim_time: f64,
        dt: f64,
    },

    TimestepEnd {
        /// Wall-clock time for the entire step (seconds).
        wall_time: f64,
    },

    /// Collision stages finished for this step.
    ContactDetection {
        body_contacts: u32,
        external_contacts: u32,
    },

    /// A bending constraint exceeded its breaking angle.
    ConstraintBroken {
        body: BodyId,
        constraint: ConstraintId,
    },

    /// A broken bending constraint rejoined the live set.
    ConstraintRecovered {
        body: BodyId,
        constraint: ConstraintId,
    },

    /// Per-body stiffness summary, emitted once per step.
    Stiffness {
        body: BodyId,
        /// Sum of current stiffness over live bending constraints.
        aggregate: f64,
        /// Live bending constraints over all bending constraints.
        living_ratio: f64,
    },

    /// Custom event for extensibility.
    Custom {
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    pub fn new(timestep: u64, kind: EventKind) -> Self {
        Self { timestep, kind }
    }
}
