//! Per-cell hit-probability estimates from sampled placements.
//!
//! A heatmap is rebuilt from scratch each turn out of a batch of sampled
//! placements and discarded afterwards. Cell selection is deterministic:
//! probability first, then a fixed tie-break (cells adjacent to an
//! unresolved hit, then lowest row, then lowest column) so repeated builds
//! over the same samples always pick the same cell.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::board::{BoardKnowledge, CellState};
use crate::core::Coord;

use super::Placement;

/// Deterministic preference order used to break probability ties.
///
/// Lower keys are preferred: cells orthogonally adjacent to an unresolved
/// hit come first (active-hunt bonus), then lower rows, then lower columns.
#[must_use]
pub fn preference_key(knowledge: &BoardKnowledge, coord: Coord) -> (u8, u8, u8) {
    let near_hit = coord
        .neighbors(knowledge.size())
        .any(|n| knowledge.cell(n) == CellState::Hit);
    (u8::from(!near_hit), coord.row, coord.col)
}

/// Per-cell hit-probability estimate aggregated over sampled placements.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Heatmap {
    size: u8,
    counts: Vec<u32>,
    samples: u32,
}

impl Heatmap {
    /// Build a heatmap from a batch of placements.
    ///
    /// Each placement contributes one count to every cell its ships occupy.
    /// Only the remaining (unsunk) fleet is counted; sunk ships are fixed,
    /// known state and carry no probability mass.
    #[must_use]
    pub fn build(size: u8, placements: &[Placement]) -> Self {
        let mut counts = vec![0u32; size as usize * size as usize];

        for placement in placements {
            for cell in placement.cells() {
                if cell.in_bounds(size) {
                    counts[cell.index(size)] += 1;
                }
            }
        }

        Self {
            size,
            counts,
            samples: placements.len() as u32,
        }
    }

    /// Board edge length.
    #[must_use]
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Number of placements aggregated.
    #[must_use]
    pub fn sample_count(&self) -> u32 {
        self.samples
    }

    /// Raw occupancy count for a cell.
    #[must_use]
    pub fn count(&self, coord: Coord) -> u32 {
        if coord.in_bounds(self.size) {
            self.counts[coord.index(self.size)]
        } else {
            0
        }
    }

    /// Estimated probability that a cell holds a ship, in [0, 1].
    #[must_use]
    pub fn probability(&self, coord: Coord) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            f64::from(self.count(coord)) / f64::from(self.samples)
        }
    }

    /// The most probable valid target, ties broken deterministically.
    ///
    /// Returns `None` only when the board has no valid targets left.
    #[must_use]
    pub fn best_cell(&self, knowledge: &BoardKnowledge) -> Option<Coord> {
        knowledge
            .valid_targets()
            .into_iter()
            .min_by_key(|&coord| (Reverse(self.count(coord)), preference_key(knowledge, coord)))
    }

    /// ASCII rendering with hit/miss markers, for debug overlays.
    ///
    /// `X` marks hits, `-` misses, `.` sunk-ship cells; open cells show a
    /// 0–9 intensity digit scaled to the hottest cell.
    #[must_use]
    pub fn render(&self, knowledge: &BoardKnowledge) -> String {
        let size = self.size;
        let max = self.counts.iter().copied().max().unwrap_or(0);

        let mut out = String::from("  ");
        for col in 0..size {
            out.push_str(&format!("{} ", col % 10));
        }
        out.push('\n');

        for row in 0..size {
            out.push((b'A' + row % 26) as char);
            out.push(' ');
            for col in 0..size {
                let coord = Coord::new(row, col);
                let glyph = match knowledge.cell(coord) {
                    CellState::Hit => 'X',
                    CellState::Miss => '-',
                    CellState::SunkPart => '.',
                    CellState::Unknown => {
                        if max == 0 {
                            '0'
                        } else {
                            let level = (u64::from(self.count(coord)) * 9 / u64::from(max)) as u8;
                            (b'0' + level) as char
                        }
                    }
                };
                out.push(glyph);
                out.push(' ');
            }
            out.push('\n');
        }

        out
    }
}
