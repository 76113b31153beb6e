//! Engine configuration.
//!
//! The decision engine owns no hidden defaults: grid size, fleet
//! composition, sampler caps, model bias strength, and search budgets are
//! all carried in an `EngineConfig` supplied by the caller. `Default`
//! produces the classic 10×10 game with the standard five-ship fleet;
//! difficulty presets start from it and adjust the search parameters.

use serde::{Deserialize, Serialize};

use crate::mcts::MctsConfig;

/// The classic fleet: carrier, battleship, cruiser, submarine, destroyer.
pub const STANDARD_FLEET: [u8; 5] = [5, 4, 3, 3, 2];

/// Default board edge length.
pub const STANDARD_BOARD_SIZE: u8 = 10;

/// Complete engine configuration.
///
/// Consumed, not owned, by the decision core: the surrounding game supplies
/// one per match and it stays fixed for the match's duration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Board edge length N for the N×N grid.
    pub board_size: u8,

    /// Ship lengths in the fleet. Order does not matter; the sampler
    /// places longest-first regardless.
    pub fleet: Vec<u8>,

    /// Master seed for the engine's RNG. Fixing it reproduces every
    /// decision of a game exactly.
    pub seed: u64,

    /// Placements drawn per heatmap build.
    pub heatmap_samples: usize,

    /// Random position draws allowed per ship before the whole placement
    /// attempt restarts.
    pub sampler_backtracks: u32,

    /// Whole-placement attempts allowed per requested sample. The sampler's
    /// global cap is this times the requested count.
    pub sampler_attempt_factor: u32,

    /// How strongly the opponent placement model biases the sampler,
    /// in [0, 1]. 0 reproduces uniform sampling exactly.
    pub bias_strength: f64,

    /// Search budgets and constants for the MCTS tiers.
    pub search: MctsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_size: STANDARD_BOARD_SIZE,
            fleet: STANDARD_FLEET.to_vec(),
            seed: 42,
            heatmap_samples: 128,
            sampler_backtracks: 32,
            sampler_attempt_factor: 48,
            bias_strength: 0.0,
            search: MctsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with a custom board and fleet.
    pub fn new(board_size: u8, fleet: Vec<u8>) -> Self {
        assert!(board_size > 0, "board must have at least one cell");
        assert!(!fleet.is_empty(), "fleet must contain at least one ship");
        assert!(
            fleet.iter().all(|&len| len > 0 && len <= board_size),
            "every ship must fit on the board"
        );

        Self {
            board_size,
            fleet,
            ..Self::default()
        }
    }

    /// Set the master seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the heatmap sample count.
    #[must_use]
    pub fn with_heatmap_samples(mut self, samples: usize) -> Self {
        self.heatmap_samples = samples;
        self
    }

    /// Set the placement-model bias strength, clamped to [0, 1].
    #[must_use]
    pub fn with_bias_strength(mut self, strength: f64) -> Self {
        self.bias_strength = strength.clamp(0.0, 1.0);
        self
    }

    /// Set the search configuration.
    #[must_use]
    pub fn with_search(mut self, search: MctsConfig) -> Self {
        self.search = search;
        self
    }

    /// Total cells occupied by the full fleet.
    #[must_use]
    pub fn fleet_cell_count(&self) -> usize {
        self.fleet.iter().map(|&len| len as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.board_size, 10);
        assert_eq!(config.fleet, vec![5, 4, 3, 3, 2]);
        assert_eq!(config.fleet_cell_count(), 17);
        assert_eq!(config.bias_strength, 0.0);
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new(8, vec![4, 3, 2])
            .with_seed(123)
            .with_heatmap_samples(64)
            .with_bias_strength(0.5);

        assert_eq!(config.board_size, 8);
        assert_eq!(config.seed, 123);
        assert_eq!(config.heatmap_samples, 64);
        assert_eq!(config.bias_strength, 0.5);
    }

    #[test]
    fn test_bias_strength_clamped() {
        let config = EngineConfig::default().with_bias_strength(3.0);
        assert_eq!(config.bias_strength, 1.0);

        let config = EngineConfig::default().with_bias_strength(-1.0);
        assert_eq!(config.bias_strength, 0.0);
    }

    #[test]
    #[should_panic(expected = "every ship must fit")]
    fn test_oversized_ship_rejected() {
        EngineConfig::new(4, vec![5]);
    }

    #[test]
    fn test_serialization() {
        let config = EngineConfig::default().with_seed(7);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.seed, 7);
        assert_eq!(deserialized.fleet, config.fleet);
    }
}
