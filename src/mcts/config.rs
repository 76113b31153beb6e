//! MCTS search configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Budgets and constants for one search.
///
/// A search stops when `simulations` complete simulations have run or
/// `time_limit` has elapsed, whichever comes first. Both checks happen
/// between simulations, never inside one, so a simulation is never
/// partially recorded and a timed search overruns by at most the cost of
/// a single simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MctsConfig {
    /// Maximum number of complete simulations.
    pub simulations: u32,

    /// Optional wall-clock budget.
    pub time_limit: Option<Duration>,

    /// UCB1 exploration constant (default: sqrt(2)).
    /// Higher values favor exploration over exploitation.
    pub exploration_constant: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            simulations: 200,
            time_limit: None,
            exploration_constant: std::f64::consts::SQRT_2,
        }
    }
}

impl MctsConfig {
    /// Set the simulation budget.
    #[must_use]
    pub fn with_simulations(mut self, simulations: u32) -> Self {
        self.simulations = simulations;
        self
    }

    /// Set the wall-clock budget.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Set the exploration constant.
    #[must_use]
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }
}
