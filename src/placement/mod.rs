//! Hypothetical placements of the opponent's unsunk ships.
//!
//! A `Placement` is one full assignment of the remaining ship lengths to
//! grid positions, consistent with everything observed so far. Ships already
//! confirmed sunk are not part of a placement; their cells are fixed, known
//! obstacles.

pub mod heatmap;
pub mod sampler;

pub use heatmap::Heatmap;
pub use sampler::{PlacementSampler, Samples, SamplingExhausted};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Coord, Orientation};

/// One ship placed on the grid as a straight line of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedShip {
    pub length: u8,
    pub start: Coord,
    pub orientation: Orientation,
}

impl PlacedShip {
    /// Create a placed ship.
    #[must_use]
    pub const fn new(length: u8, start: Coord, orientation: Orientation) -> Self {
        Self {
            length,
            start,
            orientation,
        }
    }

    /// The cells this ship occupies, from `start` outward.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.length).map(move |i| match self.orientation {
            Orientation::Horizontal => Coord::new(self.start.row, self.start.col + i),
            Orientation::Vertical => Coord::new(self.start.row + i, self.start.col),
        })
    }

    /// Whether every cell lies inside an N×N board.
    #[must_use]
    pub fn in_bounds(&self, size: u8) -> bool {
        if self.length == 0 {
            return false;
        }
        let last = self.length - 1;
        match self.orientation {
            Orientation::Horizontal => {
                self.start.in_bounds(size) && (self.start.col as u16 + last as u16) < size as u16
            }
            Orientation::Vertical => {
                self.start.in_bounds(size) && (self.start.row as u16 + last as u16) < size as u16
            }
        }
    }

    /// Whether the ship covers a coordinate.
    #[must_use]
    pub fn covers(&self, coord: Coord) -> bool {
        self.cells().any(|c| c == coord)
    }
}

/// A full, constraint-valid assignment of the remaining ship lengths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    ships: SmallVec<[PlacedShip; 8]>,
}

impl Placement {
    /// Create a placement from placed ships.
    #[must_use]
    pub fn new(ships: impl Into<SmallVec<[PlacedShip; 8]>>) -> Self {
        Self {
            ships: ships.into(),
        }
    }

    /// The placed ships, longest first.
    #[must_use]
    pub fn ships(&self) -> &[PlacedShip] {
        &self.ships
    }

    /// Whether any ship covers the coordinate.
    #[must_use]
    pub fn covers(&self, coord: Coord) -> bool {
        self.ships.iter().any(|ship| ship.covers(coord))
    }

    /// Total cells occupied.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.ships.iter().map(|ship| ship.length as usize).sum()
    }

    /// All occupied cells across all ships.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.ships.iter().flat_map(|ship| ship.cells())
    }
}
