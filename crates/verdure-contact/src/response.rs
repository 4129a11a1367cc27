//! Per-stage resolution statistics.

use serde::{Deserialize, Serialize};

/// Result of one stage's contact resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactResult {
    /// Number of corrections applied, over all passes.
    pub resolved_count: u32,
    /// Largest single correction length (meters).
    pub max_correction: f64,
    /// Sum of correction lengths (meters).
    pub total_correction: f64,
}

impl ContactResult {
    pub fn record(&mut self, correction: f64) {
        self.resolved_count += 1;
        self.max_correction = self.max_correction.max(correction);
        self.total_correction += correction;
    }
}
