//! Monte Carlo tree search over attack coordinates.
//!
//! ## Overview
//!
//! The searching player does not know where the opponent's ships are, so
//! the search reasons over *sampled* hidden states: every simulation draws
//! one placement of the remaining fleet consistent with everything observed
//! and treats it as ground truth for that simulation's rollout. Visit
//! counts aggregated across many such samples approximate the value of
//! each opening shot under the posterior.
//!
//! The search runs under a dual budget (simulation count and optional wall
//! clock) and supports cooperative cancellation; all three are checked only
//! at simulation boundaries. The tree is rebuilt fresh each turn and never
//! reused.
//!
//! ## Usage
//!
//! ```
//! use broadside::board::BoardKnowledge;
//! use broadside::core::EngineRng;
//! use broadside::mcts::{MctsConfig, MctsSearch};
//! use broadside::placement::PlacementSampler;
//!
//! let knowledge = BoardKnowledge::new(10, &[5, 4, 3, 3, 2]);
//! let config = MctsConfig::default().with_simulations(100);
//! let sampler = PlacementSampler::new(32, 48, 0.0);
//!
//! let mut search = MctsSearch::new(config, sampler, EngineRng::new(42));
//! let coord = search.select_target(&knowledge, None, None).unwrap();
//! assert!(knowledge.is_valid_target(coord));
//! ```

pub mod config;
pub mod node;
pub mod search;
pub mod stats;
pub mod tree;

pub use config::MctsConfig;
pub use node::{NodeId, SearchNode};
pub use search::{CancelToken, MctsSearch, SearchError};
pub use stats::SearchStats;
pub use tree::SearchTree;
