//! The search loop: simulate, select, expand, roll out, backpropagate.
//!
//! The true board is unknown, so every simulation draws its own fresh
//! placement sample to act as that simulation's ground truth; repeated
//! simulations with independently resampled placements approximate the
//! posterior over hidden states. The tree itself spans attack sequences:
//! descending an edge applies its shot against the current sample so the
//! hidden state stays consistent along the line of play.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use thiserror::Error;

use crate::board::{BoardKnowledge, CellState};
use crate::core::{Coord, EngineRng};
use crate::placement::heatmap::preference_key;
use crate::placement::{Placement, PlacementSampler, SamplingExhausted};

use super::config::MctsConfig;
use super::node::{NodeId, SearchNode};
use super::stats::SearchStats;
use super::tree::SearchTree;

/// Reward per hit during a rollout.
const HIT_REWARD: f64 = 1.0;
/// Bonus on top of the hit reward when the hit sinks a ship.
const SINK_BONUS: f64 = 5.0;

/// Cooperative cancellation flag for a running search.
///
/// Cancelling takes effect only at simulation boundaries, never inside a
/// simulation, so the tree is always left internally consistent. A
/// cancelled search returns its best-so-far coordinate; cancellation is
/// normal termination, not an error.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, AtomicOrdering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(AtomicOrdering::Relaxed)
    }
}

/// Error returned when a search cannot produce a coordinate.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Every cell on the board is already resolved.
    #[error("no valid targets remain to search")]
    NoValidTargets,
    /// The sampler found the recorded knowledge contradictory.
    #[error(transparent)]
    Sampling(#[from] SamplingExhausted),
}

/// One simulation's hidden state: a sampled placement treated as the truth.
///
/// Tracks which cells the line of play has fired at and how damaged each
/// hypothetical ship is, counting hits the real game already revealed.
struct GroundTruth {
    ships: Vec<SmallVec<[Coord; 8]>>,
    hits: Vec<u8>,
    sunk: Vec<bool>,
    shot: FxHashSet<Coord>,
}

impl GroundTruth {
    fn new(placement: &Placement, knowledge: &BoardKnowledge) -> Self {
        let ships: Vec<SmallVec<[Coord; 8]>> = placement
            .ships()
            .iter()
            .map(|ship| ship.cells().collect())
            .collect();

        let hits: Vec<u8> = ships
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .filter(|&&cell| knowledge.cell(cell) == CellState::Hit)
                    .count() as u8
            })
            .collect();

        let sunk: Vec<bool> = ships
            .iter()
            .zip(&hits)
            .map(|(cells, &h)| h as usize >= cells.len())
            .collect();

        Self {
            ships,
            hits,
            sunk,
            shot: FxHashSet::default(),
        }
    }

    /// Fire at a cell, returning the rollout reward for the shot.
    fn apply(&mut self, coord: Coord) -> f64 {
        if !self.shot.insert(coord) {
            return 0.0;
        }

        for (idx, cells) in self.ships.iter().enumerate() {
            if self.sunk[idx] || !cells.contains(&coord) {
                continue;
            }

            self.hits[idx] += 1;
            if self.hits[idx] as usize >= cells.len() {
                self.sunk[idx] = true;
                return HIT_REWARD + SINK_BONUS;
            }
            return HIT_REWARD;
        }

        0.0
    }

    fn was_shot(&self, coord: Coord) -> bool {
        self.shot.contains(&coord)
    }

    fn all_sunk(&self) -> bool {
        self.sunk.iter().all(|&s| s)
    }
}

/// Monte Carlo tree search over attack coordinates.
///
/// Owns the tree for exactly one decision: `select_target` rebuilds it from
/// a fresh root and the whole structure is dropped with the search (or on
/// the next call). No tree state crosses turns.
pub struct MctsSearch {
    config: MctsConfig,
    sampler: PlacementSampler,
    rng: EngineRng,
    tree: SearchTree,
    stats: SearchStats,
}

impl MctsSearch {
    /// Create a search context.
    #[must_use]
    pub fn new(config: MctsConfig, sampler: PlacementSampler, rng: EngineRng) -> Self {
        Self {
            config,
            sampler,
            rng,
            tree: SearchTree::new(Vec::new()),
            stats: SearchStats::default(),
        }
    }

    /// Search for the best attack coordinate under the configured budgets.
    ///
    /// `bias`, when supplied, flows through to every placement sample drawn
    /// during the search. Budgets and the cancel token are checked only
    /// between simulations; whatever has been learned by then decides.
    pub fn select_target(
        &mut self,
        knowledge: &BoardKnowledge,
        bias: Option<&crate::model::PlacementModel>,
        cancel: Option<&CancelToken>,
    ) -> Result<Coord, SearchError> {
        let start = Instant::now();
        self.stats.reset();

        let valid = knowledge.valid_targets();
        if valid.is_empty() {
            return Err(SearchError::NoValidTargets);
        }
        self.tree.reset(valid);

        let mut completed = 0u32;
        while completed < self.config.simulations {
            if let Some(limit) = self.config.time_limit {
                if start.elapsed() >= limit {
                    break;
                }
            }
            if cancel.is_some_and(CancelToken::is_cancelled) {
                break;
            }

            self.simulate(knowledge, bias)?;
            completed += 1;
        }

        self.stats.simulations = completed;
        self.stats.time_us = start.elapsed().as_micros() as u64;

        Ok(self.best_coord(knowledge))
    }

    /// One complete simulation against a freshly sampled hidden state.
    fn simulate(
        &mut self,
        knowledge: &BoardKnowledge,
        bias: Option<&crate::model::PlacementModel>,
    ) -> Result<(), SamplingExhausted> {
        let placement = self.sampler.sample_one(knowledge, bias, &mut self.rng)?;
        let mut ground = GroundTruth::new(&placement, knowledge);

        let mut current = self.tree.root();
        // Reward of the whole line of play under this simulation's sample,
        // accumulated shot by shot as the descent applies each edge.
        let mut reward = 0.0;

        loop {
            // Unexplored coordinates are always expanded before any
            // expanded child is revisited.
            let untried_len = self.tree.get(current).untried.len();
            if untried_len > 0 {
                let pick = self.rng.gen_range_usize(0..untried_len);
                let coord = self.tree.get_mut(current).untried.swap_remove(pick);
                let depth = self.tree.get(current).depth + 1;

                reward += ground.apply(coord);

                let child_untried: Vec<Coord> = knowledge
                    .valid_targets()
                    .into_iter()
                    .filter(|&c| !ground.was_shot(c))
                    .collect();

                let child = self
                    .tree
                    .alloc(SearchNode::new(current, coord, depth, child_untried));
                self.tree.get_mut(current).children.push(child);

                self.stats.nodes_expanded += 1;
                if depth > self.stats.max_depth {
                    self.stats.max_depth = depth;
                }

                reward += self.rollout(&mut ground, knowledge);
                self.backpropagate(child, reward);
                return Ok(());
            }

            // Fully expanded: no shots left along this line means the board
            // is exhausted here; nothing more can be gained.
            if self.tree.get(current).children.is_empty() {
                self.backpropagate(current, reward);
                return Ok(());
            }

            let chosen = self.select_child(current);
            if let Some(coord) = self.tree.get(chosen).coord {
                reward += ground.apply(coord);
            }
            current = chosen;
        }
    }

    /// Pick the child maximizing UCB1.
    fn select_child(&self, parent: NodeId) -> NodeId {
        let node = self.tree.get(parent);
        let parent_visits = node.visits.max(1);
        let c = self.config.exploration_constant;

        node.children
            .iter()
            .copied()
            .max_by(|&a, &b| {
                let ua = self.tree.get(a).ucb1(parent_visits, c);
                let ub = self.tree.get(b).ucb1(parent_visits, c);
                ua.partial_cmp(&ub).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or_else(|| self.tree.root())
    }

    /// Random playout against the simulation's ground truth.
    ///
    /// Plays up to the remaining ship-cell count of random valid shots,
    /// scoring each, and stops early once every hypothetical ship is sunk.
    fn rollout(&mut self, ground: &mut GroundTruth, knowledge: &BoardKnowledge) -> f64 {
        let mut rng = self.rng.fork();

        let mut pool: Vec<Coord> = knowledge
            .valid_targets()
            .into_iter()
            .filter(|&c| !ground.was_shot(c))
            .collect();
        rng.shuffle(&mut pool);

        let max_shots = knowledge.remaining_cell_count();
        let mut reward = 0.0;

        for (shots, coord) in pool.into_iter().enumerate() {
            if shots >= max_shots || ground.all_sunk() {
                break;
            }
            reward += ground.apply(coord);
        }

        reward
    }

    /// Add the reward and a visit to every node from `from` up to the root.
    fn backpropagate(&mut self, from: NodeId, reward: f64) {
        let mut current = from;
        loop {
            let node = self.tree.get_mut(current);
            node.visits += 1;
            node.total_reward += reward;

            let parent = node.parent;
            if parent.is_none() {
                break;
            }
            current = parent;
        }
    }

    /// The root child with the most visits; the visit count is robust to
    /// high-variance single-sample outliers in a way mean reward is not.
    /// Ties (and the zero-simulation case) fall back to the deterministic
    /// scan preference.
    fn best_coord(&self, knowledge: &BoardKnowledge) -> Coord {
        let root = self.tree.root_node();

        let best_child = root
            .children
            .iter()
            .copied()
            .filter_map(|id| {
                let node = self.tree.get(id);
                node.coord
                    .map(|coord| (Reverse(node.visits), preference_key(knowledge, coord), coord))
            })
            .min();

        match best_child {
            Some((_, _, coord)) => coord,
            None => {
                // No simulation completed: deterministic preference over the
                // untried root coordinates.
                root.untried
                    .iter()
                    .copied()
                    .min_by_key(|&coord| preference_key(knowledge, coord))
                    .unwrap_or(Coord::new(0, 0))
            }
        }
    }

    /// Visit counts of the root's children after the most recent search.
    #[must_use]
    pub fn root_visits(&self) -> Vec<(Coord, u32)> {
        self.tree
            .root_node()
            .children
            .iter()
            .filter_map(|&id| {
                let node = self.tree.get(id);
                node.coord.map(|coord| (coord, node.visits))
            })
            .collect()
    }

    /// Statistics from the most recent search.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }
}
