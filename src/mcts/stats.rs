//! Search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Statistics collected during one search.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Complete simulations performed.
    pub simulations: u32,

    /// Nodes expanded (added to the tree).
    pub nodes_expanded: u32,

    /// Maximum tree depth reached.
    pub max_depth: u16,

    /// Total search time (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    /// Create new empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all statistics to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Simulations per second.
    #[must_use]
    pub fn simulations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            f64::from(self.simulations) / (self.time_us as f64 / 1_000_000.0)
        }
    }
}
