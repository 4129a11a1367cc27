//! Pluggable event sinks.

use std::sync::{Arc, Mutex};

use tracing::Level;

use crate::events::SimulationEvent;

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the simulation ends.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in memory.
///
/// The buffer is shared, so a caller can keep a handle from [`VecSink::shared`]
/// after boxing the sink into a bus.
#[derive(Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the collected events.
    pub fn shared(&self) -> Arc<Mutex<Vec<SimulationEvent>>> {
        Arc::clone(&self.events)
    }

    /// Copies out everything collected so far.
    pub fn events(&self) -> Vec<SimulationEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Forwards events to `tracing` at a fixed level.
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        let timestep = event.timestep;
        let kind = &event.kind;
        // tracing needs the level at compile time
        match self.level {
            Level::ERROR => tracing::error!(timestep, event = ?kind, "simulation_event"),
            Level::WARN => tracing::warn!(timestep, event = ?kind, "simulation_event"),
            Level::INFO => tracing::info!(timestep, event = ?kind, "simulation_event"),
            Level::DEBUG => tracing::debug!(timestep, event = ?kind, "simulation_event"),
            Level::TRACE => tracing::trace!(timestep, event = ?kind, "simulation_event"),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
