//! # broadside
//!
//! Opponent decision engine for a turn-based naval combat game: the set of
//! targeting strategies an automated player uses to pick attack coordinates
//! against a hidden grid of ships, up to a budgeted Monte Carlo tree search
//! that reasons under uncertainty about where the opponent placed its fleet.
//!
//! ## Design Principles
//!
//! 1. **Knowledge-Driven**: Every decision is a function of one
//!    `BoardKnowledge` — the attacker's record of shot outcomes — never of
//!    hidden game state the attacker could not legitimately see.
//!
//! 2. **Deterministic Under Seed**: All randomness flows through a seeded,
//!    forkable `EngineRng`; a fixed seed reproduces a whole decision.
//!
//! 3. **Configuration Over Convention**: Grid size, fleet, sampling caps
//!    and search budgets arrive in an `EngineConfig`; the engine hides no
//!    defaults of its own.
//!
//! ## Architecture
//!
//! - **Sampled Hidden States**: The true board is unknown, so the sampler
//!   draws full fleet placements consistent with the evidence; cheap tiers
//!   aggregate them into a heatmap, the search tiers use one fresh sample
//!   per simulation as that simulation's ground truth.
//!
//! - **Short-Lived Trees**: Each turn's search owns its tree and drops it
//!   with the decision; nothing is reused across turns.
//!
//! - **One Shared Table**: The only process-wide mutable state is the
//!   opponent placement model, read at turn start and written at game end
//!   behind an `RwLock`.
//!
//! ## Modules
//!
//! - `core`: coordinates, RNG, configuration
//! - `board`: shot-outcome tracking per opposing board
//! - `placement`: constraint-consistent sampling and heatmaps
//! - `model`: persisted opponent placement tendencies
//! - `strategy`: difficulty tiers and dispatch
//! - `policy`: pluggable learned-policy slot
//! - `mcts`: budgeted Monte Carlo tree search
//! - `history`: game records and difficulty recommendation

pub mod board;
pub mod core;
pub mod history;
pub mod mcts;
pub mod model;
pub mod placement;
pub mod policy;
pub mod strategy;

// Re-export commonly used types
pub use crate::core::{Coord, EngineConfig, EngineRng, Orientation};

pub use crate::board::{
    BoardKnowledge, CannotRecordReason, CellState, ShotOutcome, ShotRecordError,
};

pub use crate::placement::{
    Heatmap, PlacedShip, Placement, PlacementSampler, Samples, SamplingExhausted,
};

pub use crate::model::{FrequencyKey, ModelError, PlacementModel, SharedPlacementModel};

pub use crate::strategy::{DecideError, Difficulty, Strategy, StrategySelector};

pub use crate::policy::{EncodedBoard, TargetPolicy, UniformPolicy, UntrainedPolicy};

pub use crate::mcts::{
    CancelToken, MctsConfig, MctsSearch, NodeId, SearchError, SearchNode, SearchStats, SearchTree,
};

pub use crate::history::{DifficultySummary, GameRecord, HistoryError, MatchHistory};
