//! # verdure-telemetry
//!
//! Event bus for simulation telemetry. The solver emits structured events
//! (timestep timing, contact counts, constraint breakage and recovery, body
//! stiffness) that are consumed by pluggable sinks.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
