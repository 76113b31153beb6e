//! Difficulty tiers and the strategy dispatch.
//!
//! Each tier is an interchangeable targeting strategy mapped from a
//! `Difficulty` that stays fixed for the whole game. Dispatch goes through
//! a tagged `Strategy` variant rather than trait objects, so adding a tier
//! means adding a variant and an arm.

mod hunt;

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::BoardKnowledge;
use crate::core::{Coord, EngineConfig, EngineRng};
use crate::mcts::{CancelToken, MctsConfig, MctsSearch, SearchError};
use crate::model::SharedPlacementModel;
use crate::placement::heatmap::preference_key;
use crate::placement::{Heatmap, Placement, PlacementSampler, SamplingExhausted};
use crate::policy::{encode, TargetPolicy};

use hunt::{checkerboard_targets, probe_unresolved_hits};

/// Opponent difficulty, fixed for the duration of one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
    Master,
    Nightmare,
}

impl Difficulty {
    /// All tiers, easiest first.
    pub const ALL: [Difficulty; 6] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
        Difficulty::Master,
        Difficulty::Nightmare,
    ];

    /// The canonical engine configuration for this tier.
    #[must_use]
    pub fn preset(self) -> EngineConfig {
        let base = EngineConfig::default();
        match self {
            Difficulty::Easy | Difficulty::Medium => base,
            Difficulty::Hard => base.with_bias_strength(0.6),
            Difficulty::Expert | Difficulty::Master => {
                base.with_search(MctsConfig::default().with_simulations(200))
            }
            Difficulty::Nightmare => base.with_search(
                MctsConfig::default()
                    .with_simulations(500)
                    .with_time_limit(Duration::from_secs(5)),
            ),
        }
    }

    /// The next tier up (saturating at Nightmare).
    #[must_use]
    pub fn harder(self) -> Difficulty {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Expert,
            Difficulty::Expert => Difficulty::Master,
            Difficulty::Master | Difficulty::Nightmare => Difficulty::Nightmare,
        }
    }

    /// The next tier down (saturating at Easy).
    #[must_use]
    pub fn easier(self) -> Difficulty {
        match self {
            Difficulty::Easy | Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Expert => Difficulty::Hard,
            Difficulty::Master => Difficulty::Expert,
            Difficulty::Nightmare => Difficulty::Master,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
            Difficulty::Master => "Master",
            Difficulty::Nightmare => "Nightmare",
        };
        write!(f, "{name}")
    }
}

/// The targeting strategy behind a tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Uniform-random choice among valid targets.
    Random,
    /// Checkerboard hunt, orthogonal probing once a hit lands.
    HuntTarget,
    /// Hunt/target with model-biased heatmap hunting.
    AdaptiveHuntTarget,
    /// Budgeted Monte Carlo tree search.
    Mcts,
    /// Installed learned policy, or the search tier when absent.
    LearnedPolicyOrFallback,
}

impl Strategy {
    /// Map a difficulty to its strategy.
    #[must_use]
    pub fn for_difficulty(difficulty: Difficulty) -> Strategy {
        match difficulty {
            Difficulty::Easy => Strategy::Random,
            Difficulty::Medium => Strategy::HuntTarget,
            Difficulty::Hard => Strategy::AdaptiveHuntTarget,
            Difficulty::Expert | Difficulty::Nightmare => Strategy::Mcts,
            Difficulty::Master => Strategy::LearnedPolicyOrFallback,
        }
    }
}

/// Error surfaced by a targeting decision.
#[derive(Debug, Error)]
pub enum DecideError {
    /// Every cell on the board is already resolved.
    #[error("no valid targets remain on the board")]
    BoardExhausted,
    /// The recorded knowledge admits no consistent placement.
    #[error(transparent)]
    Sampling(#[from] SamplingExhausted),
}

impl From<SearchError> for DecideError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NoValidTargets => DecideError::BoardExhausted,
            SearchError::Sampling(inner) => DecideError::Sampling(inner),
        }
    }
}

/// Per-turn targeting dispatch for one game.
///
/// Owns the game's RNG stream; the shared placement model and the learned
/// policy are optional capabilities installed at construction. The real
/// game calls `decide` once per opponent turn and reports the shot's
/// outcome back to the `BoardKnowledge` it owns.
pub struct StrategySelector {
    difficulty: Difficulty,
    strategy: Strategy,
    config: EngineConfig,
    rng: EngineRng,
    model: Option<SharedPlacementModel>,
    policy: Option<Arc<dyn TargetPolicy>>,
}

impl StrategySelector {
    /// Create a selector for one game at a fixed difficulty.
    #[must_use]
    pub fn new(difficulty: Difficulty, config: EngineConfig) -> Self {
        let rng = EngineRng::new(config.seed);
        Self {
            difficulty,
            strategy: Strategy::for_difficulty(difficulty),
            config,
            rng,
            model: None,
            policy: None,
        }
    }

    /// Install the process-wide placement model.
    #[must_use]
    pub fn with_model(mut self, model: SharedPlacementModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Install a learned targeting policy for the Master tier.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn TargetPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// This game's difficulty.
    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The strategy in use.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Choose the next attack coordinate.
    pub fn decide(&mut self, knowledge: &BoardKnowledge) -> Result<Coord, DecideError> {
        self.decide_with_cancel(knowledge, None)
    }

    /// Choose the next attack coordinate, with cooperative cancellation for
    /// the search tiers. Cancellation lands between simulations and yields
    /// the best-so-far choice.
    pub fn decide_with_cancel(
        &mut self,
        knowledge: &BoardKnowledge,
        cancel: Option<&CancelToken>,
    ) -> Result<Coord, DecideError> {
        match self.strategy {
            Strategy::Random => self.random_target(knowledge),
            Strategy::HuntTarget => self.hunt_target(knowledge),
            Strategy::AdaptiveHuntTarget => self.adaptive_hunt_target(knowledge),
            Strategy::Mcts => self.search_target(knowledge, cancel),
            Strategy::LearnedPolicyOrFallback => self.learned_or_search(knowledge, cancel),
        }
    }

    fn random_target(&mut self, knowledge: &BoardKnowledge) -> Result<Coord, DecideError> {
        let targets = knowledge.valid_targets();
        self.rng
            .choose(&targets)
            .copied()
            .ok_or(DecideError::BoardExhausted)
    }

    fn hunt_target(&mut self, knowledge: &BoardKnowledge) -> Result<Coord, DecideError> {
        if let Some(coord) = probe_unresolved_hits(knowledge) {
            return Ok(coord);
        }

        let candidates = checkerboard_targets(knowledge);
        self.rng
            .choose(&candidates)
            .copied()
            .ok_or(DecideError::BoardExhausted)
    }

    fn adaptive_hunt_target(&mut self, knowledge: &BoardKnowledge) -> Result<Coord, DecideError> {
        if let Some(coord) = probe_unresolved_hits(knowledge) {
            return Ok(coord);
        }

        let placements = self.sample_batch(knowledge)?;
        let heat = Heatmap::build(knowledge.size(), &placements);
        heat.best_cell(knowledge).ok_or(DecideError::BoardExhausted)
    }

    fn search_target(
        &mut self,
        knowledge: &BoardKnowledge,
        cancel: Option<&CancelToken>,
    ) -> Result<Coord, DecideError> {
        let sampler = PlacementSampler::from_config(&self.config);
        let mut search = MctsSearch::new(self.config.search.clone(), sampler, self.rng.fork());

        let result = match &self.model {
            Some(shared) => {
                let guard = shared.read().unwrap_or_else(PoisonError::into_inner);
                search.select_target(knowledge, Some(&guard), cancel)
            }
            None => search.select_target(knowledge, None, cancel),
        };

        result.map_err(DecideError::from)
    }

    fn learned_or_search(
        &mut self,
        knowledge: &BoardKnowledge,
        cancel: Option<&CancelToken>,
    ) -> Result<Coord, DecideError> {
        if let Some(policy) = self.policy.clone() {
            if policy.is_ready() {
                return self.policy_target(knowledge, policy.as_ref());
            }
        }

        // Missing or uninitialized policy is recovered here, never surfaced:
        // the search tier answers with the same budgets.
        self.search_target(knowledge, cancel)
    }

    fn policy_target(
        &mut self,
        knowledge: &BoardKnowledge,
        policy: &dyn TargetPolicy,
    ) -> Result<Coord, DecideError> {
        let placements = self.sample_batch(knowledge)?;
        let heat = Heatmap::build(knowledge.size(), &placements);
        let encoded = encode(knowledge, &heat);
        let scores = policy.score(&encoded);

        let size = knowledge.size();
        knowledge
            .valid_targets()
            .into_iter()
            .min_by(|&a, &b| {
                let score_a = scores.get(a.index(size)).copied().unwrap_or(f32::NEG_INFINITY);
                let score_b = scores.get(b.index(size)).copied().unwrap_or(f32::NEG_INFINITY);
                score_b
                    .partial_cmp(&score_a)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| preference_key(knowledge, a).cmp(&preference_key(knowledge, b)))
            })
            .ok_or(DecideError::BoardExhausted)
    }

    /// Draw a heatmap-sized batch of placements, biased by the shared model
    /// when one is installed.
    fn sample_batch(&mut self, knowledge: &BoardKnowledge) -> Result<Vec<Placement>, DecideError> {
        let sampler = PlacementSampler::from_config(&self.config);
        let count = self.config.heatmap_samples;

        let placements = match &self.model {
            Some(shared) => {
                let guard = shared.read().unwrap_or_else(PoisonError::into_inner);
                sampler.sample(knowledge, count, Some(&guard), &mut self.rng)?
            }
            None => sampler.sample(knowledge, count, None, &mut self.rng)?,
        };

        Ok(placements)
    }
}
