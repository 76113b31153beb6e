//! Pluggable learned-policy slot for the Master tier.
//!
//! The engine treats a trained targeting network as a capability, not a
//! component: anything implementing `TargetPolicy` can be installed, and
//! nothing breaks when the slot is empty or the implementation reports it
//! is not ready — the Master tier silently falls back to search.

use serde::{Deserialize, Serialize};

use crate::board::{BoardKnowledge, CellState};
use crate::core::Coord;
use crate::placement::Heatmap;

/// Encoded board state as a flat tensor for policy input.
///
/// Three channels over the N×N grid, row-major within each channel:
/// hits (including sunk-ship cells), misses, and normalized heat.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncodedBoard {
    /// Flattened tensor data, channel-major.
    pub tensor: Vec<f32>,

    /// Tensor shape: [channels, rows, cols].
    pub shape: [usize; 3],
}

impl EncodedBoard {
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    /// Whether the tensor is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }
}

/// Encode knowledge plus a heatmap into policy input.
#[must_use]
pub fn encode(knowledge: &BoardKnowledge, heat: &Heatmap) -> EncodedBoard {
    let size = knowledge.size() as usize;
    let cells = size * size;
    let mut tensor = vec![0.0f32; 3 * cells];

    let max_count = (0..knowledge.size())
        .flat_map(|row| (0..knowledge.size()).map(move |col| Coord::new(row, col)))
        .map(|c| heat.count(c))
        .max()
        .unwrap_or(0);

    for row in 0..knowledge.size() {
        for col in 0..knowledge.size() {
            let coord = Coord::new(row, col);
            let idx = coord.index(knowledge.size());

            match knowledge.cell(coord) {
                CellState::Hit | CellState::SunkPart => tensor[idx] = 1.0,
                CellState::Miss => tensor[cells + idx] = 1.0,
                CellState::Unknown => {}
            }

            if max_count > 0 {
                tensor[2 * cells + idx] = heat.count(coord) as f32 / max_count as f32;
            }
        }
    }

    EncodedBoard {
        tensor,
        shape: [3, size, size],
    }
}

/// A targeting policy scoring every cell of the board.
///
/// Scores are relative; the caller masks resolved cells and fires at the
/// highest-scoring valid one. `is_ready` lets an implementation that needs
/// loading (weights, a remote session) report that it cannot serve yet.
pub trait TargetPolicy: Send + Sync {
    /// Whether the policy can currently produce scores.
    fn is_ready(&self) -> bool {
        true
    }

    /// Score every cell; length must be rows × cols of the encoded board.
    fn score(&self, board: &EncodedBoard) -> Vec<f32>;
}

/// Uniform baseline policy: every cell scores the same.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformPolicy;

impl TargetPolicy for UniformPolicy {
    fn score(&self, board: &EncodedBoard) -> Vec<f32> {
        let cells = board.shape[1] * board.shape[2];
        if cells == 0 {
            return vec![];
        }
        vec![1.0 / cells as f32; cells]
    }
}

/// A policy whose weights were never loaded. Always reports not ready.
#[derive(Clone, Copy, Debug, Default)]
pub struct UntrainedPolicy;

impl TargetPolicy for UntrainedPolicy {
    fn is_ready(&self) -> bool {
        false
    }

    fn score(&self, board: &EncodedBoard) -> Vec<f32> {
        vec![0.0; board.shape[1] * board.shape[2]]
    }
}
