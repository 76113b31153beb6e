//! Board state tracking: what the attacker knows about the opponent grid.
//!
//! `BoardKnowledge` records the outcome of every shot fired at one opposing
//! board and maintains the multiset of ship lengths not yet confirmed sunk.
//! One instance exists per opposing board and is owned by exactly one game.
//!
//! The cell map uses `im::HashMap` so MCTS simulations can snapshot the
//! knowledge in O(1).

use std::collections::VecDeque;

use im::HashMap as ImHashMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::Coord;

/// What the attacker knows about a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Never fired at.
    #[default]
    Unknown,
    /// Fired at, no ship there.
    Miss,
    /// Fired at, part of a ship that is still afloat.
    Hit,
    /// Part of a ship confirmed destroyed.
    SunkPart,
}

impl CellState {
    /// A cell is resolved once any shot outcome has been recorded for it.
    #[inline]
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, CellState::Unknown)
    }
}

/// Outcome of a shot, as reported by the real game after it is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotOutcome {
    /// No ship at the cell.
    Miss,
    /// A ship was struck but not destroyed.
    Hit,
    /// The shot destroyed a ship of the given length.
    Sunk(u8),
}

/// Reason why a shot result could not be recorded.
///
/// All of these indicate a caller bug upstream: the tracker's state is left
/// untouched and the error must not be swallowed.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CannotRecordReason {
    /// The cell lies outside the grid.
    #[error("cell is outside the grid")]
    OutOfBounds,
    /// A result was already recorded for the cell.
    #[error("cell already has a recorded result")]
    AlreadyResolved,
    /// A sink was reported for a length not in the remaining fleet.
    #[error("no remaining ship of the reported length")]
    UnknownShipLength,
    /// A sink was reported but the connected hits do not form a full ship.
    #[error("connected hits do not account for the sunk ship")]
    IncompleteShip,
}

/// Error returned when recording a shot result fails.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("could not record result at {coord}: {reason}")]
pub struct ShotRecordError {
    reason: CannotRecordReason,
    coord: Coord,
}

impl ShotRecordError {
    fn new(reason: CannotRecordReason, coord: Coord) -> Self {
        Self { reason, coord }
    }

    /// Why recording failed.
    #[must_use]
    pub fn reason(&self) -> CannotRecordReason {
        self.reason
    }

    /// The offending coordinate.
    #[must_use]
    pub fn coord(&self) -> Coord {
        self.coord
    }
}

/// The attacking player's knowledge of one opposing board.
///
/// Invariant: the recorded Hit/SunkPart cells are always consistent with at
/// least one valid placement of the remaining ship lengths; `record_result`
/// rejects (rather than absorbs) updates that would be self-contradictory
/// at the cell level.
#[derive(Clone, Debug)]
pub struct BoardKnowledge {
    size: u8,
    cells: ImHashMap<Coord, CellState>,
    /// Remaining ship lengths, kept sorted descending.
    remaining: Vec<u8>,
}

impl BoardKnowledge {
    /// Create knowledge of a fresh N×N board with the given fleet afloat.
    pub fn new(size: u8, fleet: &[u8]) -> Self {
        assert!(size > 0, "board must have at least one cell");

        let mut remaining = fleet.to_vec();
        remaining.sort_unstable_by(|a, b| b.cmp(a));

        Self {
            size,
            cells: ImHashMap::new(),
            remaining,
        }
    }

    /// Board edge length.
    #[inline]
    #[must_use]
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Status of a cell. Out-of-bounds coordinates read as `Unknown`.
    #[must_use]
    pub fn cell(&self, coord: Coord) -> CellState {
        self.cells.get(&coord).copied().unwrap_or_default()
    }

    /// True for in-bounds cells with no recorded result.
    #[must_use]
    pub fn is_valid_target(&self, coord: Coord) -> bool {
        coord.in_bounds(self.size) && !self.cell(coord).is_resolved()
    }

    /// Remaining ship lengths (descending), not yet confirmed sunk.
    #[must_use]
    pub fn remaining_ships(&self) -> &[u8] {
        &self.remaining
    }

    /// Total cells occupied by ships still afloat.
    #[must_use]
    pub fn remaining_cell_count(&self) -> usize {
        self.remaining.iter().map(|&len| len as usize).sum()
    }

    /// Whether the whole fleet has been sunk.
    #[must_use]
    pub fn fleet_sunk(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Hit cells whose ship has not yet been confirmed sunk,
    /// in (row, col) order.
    #[must_use]
    pub fn unresolved_hits(&self) -> Vec<Coord> {
        let mut hits: Vec<Coord> = self
            .cells
            .iter()
            .filter(|(_, &state)| state == CellState::Hit)
            .map(|(&coord, _)| coord)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Whether any hit is still awaiting its ship's destruction.
    #[must_use]
    pub fn has_unresolved_hit(&self) -> bool {
        self.cells.values().any(|&state| state == CellState::Hit)
    }

    /// All unresolved cells, in row-major order.
    #[must_use]
    pub fn valid_targets(&self) -> Vec<Coord> {
        let mut targets = Vec::with_capacity(self.size as usize * self.size as usize);
        for row in 0..self.size {
            for col in 0..self.size {
                let coord = Coord::new(row, col);
                if !self.cell(coord).is_resolved() {
                    targets.push(coord);
                }
            }
        }
        targets
    }

    /// Record the real outcome of a shot.
    ///
    /// On `Sunk`, every cell of the destroyed ship is marked `SunkPart` and
    /// its length is removed from the remaining fleet. The destroyed ship's
    /// cells are recovered by walking hits connected to the sinking shot.
    ///
    /// Fails without modifying any state if the cell is out of bounds,
    /// already resolved, or the reported sink contradicts the tracker.
    pub fn record_result(
        &mut self,
        coord: Coord,
        outcome: ShotOutcome,
    ) -> Result<(), ShotRecordError> {
        if !coord.in_bounds(self.size) {
            return Err(ShotRecordError::new(CannotRecordReason::OutOfBounds, coord));
        }
        if self.cell(coord).is_resolved() {
            return Err(ShotRecordError::new(
                CannotRecordReason::AlreadyResolved,
                coord,
            ));
        }

        match outcome {
            ShotOutcome::Miss => {
                self.cells.insert(coord, CellState::Miss);
            }
            ShotOutcome::Hit => {
                self.cells.insert(coord, CellState::Hit);
            }
            ShotOutcome::Sunk(length) => {
                let Some(pos) = self.remaining.iter().position(|&len| len == length) else {
                    return Err(ShotRecordError::new(
                        CannotRecordReason::UnknownShipLength,
                        coord,
                    ));
                };

                let ship_cells = self.connected_ship_cells(coord, length);
                if ship_cells.len() != length as usize {
                    return Err(ShotRecordError::new(
                        CannotRecordReason::IncompleteShip,
                        coord,
                    ));
                }

                for cell in ship_cells {
                    self.cells.insert(cell, CellState::SunkPart);
                }
                self.remaining.remove(pos);
            }
        }

        Ok(())
    }

    /// Walk hits connected to the sinking shot to recover the destroyed
    /// ship's cells. The sinking cell itself counts as a hit even though
    /// it has not been recorded yet.
    fn connected_ship_cells(&self, origin: Coord, length: u8) -> SmallVec<[Coord; 8]> {
        let mut visited: FxHashSet<Coord> = FxHashSet::default();
        let mut queue: VecDeque<Coord> = VecDeque::new();
        let mut ship: SmallVec<[Coord; 8]> = SmallVec::new();

        queue.push_back(origin);
        while let Some(current) = queue.pop_front() {
            if ship.len() >= length as usize {
                break;
            }
            if !visited.insert(current) {
                continue;
            }

            let is_hit = current == origin || self.cell(current) == CellState::Hit;
            if !is_hit {
                continue;
            }

            ship.push(current);
            for neighbor in current.neighbors(self.size) {
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        ship
    }
}
