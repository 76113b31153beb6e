//! Constraint-consistent placement sampling.
//!
//! Randomized greedy backtracking: ships are placed longest-first at random
//! positions and orientations, rejecting immediately on any conflict with a
//! miss, a sunk ship's cell, or an already-placed ship. A bounded number of
//! redraws is allowed per ship; when exhausted the whole placement restarts.
//! A finished placement is kept only if it covers every unresolved hit.
//!
//! Sampling never blocks: whole-placement attempts are capped at a fixed
//! multiple of the requested count, so a batch may come back short. Coming
//! back *empty* means the recorded knowledge itself is contradictory, which
//! is surfaced as `SamplingExhausted` rather than retried.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use thiserror::Error;

use crate::board::{BoardKnowledge, CellState};
use crate::core::{Coord, EngineConfig, EngineRng, Orientation};
use crate::model::PlacementModel;

use super::{PlacedShip, Placement};

/// Error returned when no consistent placement exists within the attempt cap.
///
/// Signals contradictory recorded results; retrying cannot help.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("no consistent ship placement found after {attempts} attempts")]
pub struct SamplingExhausted {
    /// Whole-placement attempts consumed before giving up.
    pub attempts: u32,
}

/// Generates placements of the remaining fleet consistent with a
/// `BoardKnowledge`.
#[derive(Clone, Copy, Debug)]
pub struct PlacementSampler {
    backtracks_per_ship: u32,
    attempt_factor: u32,
    bias_strength: f64,
}

impl PlacementSampler {
    /// Create a sampler with explicit caps.
    #[must_use]
    pub fn new(backtracks_per_ship: u32, attempt_factor: u32, bias_strength: f64) -> Self {
        Self {
            backtracks_per_ship,
            attempt_factor: attempt_factor.max(1),
            bias_strength: bias_strength.clamp(0.0, 1.0),
        }
    }

    /// Create a sampler from an engine configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.sampler_backtracks,
            config.sampler_attempt_factor,
            config.bias_strength,
        )
    }

    /// Lazily produce up to `count` placements consistent with `knowledge`.
    ///
    /// When `bias` is supplied, position and orientation candidates are drawn
    /// from a distribution weighted by the model's historical frequencies
    /// instead of uniformly. The iterator ends early once the attempt cap
    /// (`attempt_factor * count`) is spent.
    pub fn iter<'a>(
        &'a self,
        knowledge: &'a BoardKnowledge,
        count: usize,
        bias: Option<&'a PlacementModel>,
        rng: &'a mut EngineRng,
    ) -> Samples<'a> {
        let cap = self.attempt_factor.saturating_mul(count as u32);
        Samples {
            sampler: self,
            knowledge,
            bias,
            rng,
            wanted: count,
            attempts_left: cap,
        }
    }

    /// Collect up to `count` placements, failing only if none could be found.
    pub fn sample(
        &self,
        knowledge: &BoardKnowledge,
        count: usize,
        bias: Option<&PlacementModel>,
        rng: &mut EngineRng,
    ) -> Result<Vec<Placement>, SamplingExhausted> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let cap = self.attempt_factor.saturating_mul(count as u32);
        let placements: Vec<Placement> = self.iter(knowledge, count, bias, rng).collect();

        if placements.is_empty() {
            Err(SamplingExhausted { attempts: cap })
        } else {
            Ok(placements)
        }
    }

    /// Draw a single placement.
    pub fn sample_one(
        &self,
        knowledge: &BoardKnowledge,
        bias: Option<&PlacementModel>,
        rng: &mut EngineRng,
    ) -> Result<Placement, SamplingExhausted> {
        for _ in 0..self.attempt_factor {
            if let Some(placement) = self.try_placement(knowledge, bias, rng) {
                return Ok(placement);
            }
        }
        Err(SamplingExhausted {
            attempts: self.attempt_factor,
        })
    }

    /// One whole-placement attempt. `None` means a restart is needed.
    fn try_placement(
        &self,
        knowledge: &BoardKnowledge,
        bias: Option<&PlacementModel>,
        rng: &mut EngineRng,
    ) -> Option<Placement> {
        let size = knowledge.size();
        let mut occupied: FxHashSet<Coord> = FxHashSet::default();
        let mut ships: SmallVec<[PlacedShip; 8]> = SmallVec::new();

        // remaining_ships() is already sorted longest-first
        for &length in knowledge.remaining_ships() {
            let mut placed = false;

            for _ in 0..=self.backtracks_per_ship {
                let candidate = match bias {
                    Some(model) if self.bias_strength > 0.0 => {
                        self.draw_biased(length, size, model, rng)?
                    }
                    _ => draw_uniform(length, size, rng)?,
                };

                if fits(&candidate, knowledge, &occupied) {
                    occupied.extend(candidate.cells());
                    ships.push(candidate);
                    placed = true;
                    break;
                }
            }

            if !placed {
                return None;
            }
        }

        // Every unresolved hit must belong to one of the placed ships.
        for hit in knowledge.unresolved_hits() {
            if !occupied.contains(&hit) {
                return None;
            }
        }

        Some(Placement::new(ships))
    }

    /// Draw a candidate weighted by the placement model's frequencies.
    fn draw_biased(
        &self,
        length: u8,
        size: u8,
        model: &PlacementModel,
        rng: &mut EngineRng,
    ) -> Option<PlacedShip> {
        let candidates = enumerate_candidates(length, size);
        if candidates.is_empty() {
            return None;
        }

        let weights: Vec<f64> = candidates
            .iter()
            .map(|ship| model.weight(ship.length, ship.start, ship.orientation, size, self.bias_strength))
            .collect();

        let idx = rng.choose_weighted(&weights)?;
        Some(candidates[idx])
    }
}

/// All in-bounds (start, orientation) candidates for a ship length.
fn enumerate_candidates(length: u8, size: u8) -> Vec<PlacedShip> {
    if length == 0 || length > size {
        return Vec::new();
    }

    let span = size - length + 1;
    let mut candidates = Vec::with_capacity(2 * size as usize * span as usize);
    for orientation in Orientation::ALL {
        for row in 0..size {
            for col in 0..size {
                let ship = PlacedShip::new(length, Coord::new(row, col), orientation);
                if ship.in_bounds(size) {
                    candidates.push(ship);
                }
            }
        }
    }
    candidates
}

/// Draw a uniformly random in-bounds candidate without enumerating.
fn draw_uniform(length: u8, size: u8, rng: &mut EngineRng) -> Option<PlacedShip> {
    if length == 0 || length > size {
        return None;
    }

    let span = (size - length + 1) as usize;
    let per_orientation = size as usize * span;
    let idx = rng.gen_range_usize(0..2 * per_orientation);

    let (orientation, offset) = if idx < per_orientation {
        (Orientation::Horizontal, idx)
    } else {
        (Orientation::Vertical, idx - per_orientation)
    };

    let start = match orientation {
        Orientation::Horizontal => Coord::new((offset / span) as u8, (offset % span) as u8),
        Orientation::Vertical => Coord::new((offset % span) as u8, (offset / span) as u8),
    };

    Some(PlacedShip::new(length, start, orientation))
}

/// A candidate fits when no cell is a miss, a sunk ship's cell, or occupied
/// by a ship placed earlier in this attempt.
fn fits(ship: &PlacedShip, knowledge: &BoardKnowledge, occupied: &FxHashSet<Coord>) -> bool {
    ship.cells().all(|cell| {
        !matches!(
            knowledge.cell(cell),
            CellState::Miss | CellState::SunkPart
        ) && !occupied.contains(&cell)
    })
}

/// Lazy, finite sequence of sampled placements.
///
/// Yields until the requested count is produced or the attempt cap is spent,
/// whichever comes first.
pub struct Samples<'a> {
    sampler: &'a PlacementSampler,
    knowledge: &'a BoardKnowledge,
    bias: Option<&'a PlacementModel>,
    rng: &'a mut EngineRng,
    wanted: usize,
    attempts_left: u32,
}

impl Iterator for Samples<'_> {
    type Item = Placement;

    fn next(&mut self) -> Option<Placement> {
        while self.wanted > 0 && self.attempts_left > 0 {
            self.attempts_left -= 1;
            if let Some(placement) =
                self.sampler
                    .try_placement(self.knowledge, self.bias, self.rng)
            {
                self.wanted -= 1;
                return Some(placement);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ShotOutcome;

    fn sampler() -> PlacementSampler {
        PlacementSampler::new(32, 48, 0.0)
    }

    fn assert_consistent(placement: &Placement, knowledge: &BoardKnowledge) {
        let size = knowledge.size();
        let mut seen: FxHashSet<Coord> = FxHashSet::default();

        for ship in placement.ships() {
            assert!(ship.in_bounds(size), "ship out of bounds: {ship:?}");
            for cell in ship.cells() {
                assert!(seen.insert(cell), "ships overlap at {cell}");
                assert_ne!(knowledge.cell(cell), CellState::Miss, "ship on a miss");
                assert_ne!(
                    knowledge.cell(cell),
                    CellState::SunkPart,
                    "ship on a sunk cell"
                );
            }
        }

        for hit in knowledge.unresolved_hits() {
            assert!(seen.contains(&hit), "unresolved hit {hit} uncovered");
        }
    }

    #[test]
    fn test_sample_fresh_board() {
        let knowledge = BoardKnowledge::new(10, &[5, 4, 3, 3, 2]);
        let mut rng = EngineRng::new(42);

        let placements = sampler().sample(&knowledge, 16, None, &mut rng).unwrap();
        assert_eq!(placements.len(), 16);
        for placement in &placements {
            assert_eq!(placement.cell_count(), 17);
            assert_consistent(placement, &knowledge);
        }
    }

    #[test]
    fn test_sample_respects_misses_and_hits() {
        let mut knowledge = BoardKnowledge::new(10, &[5, 4, 3, 3, 2]);
        knowledge
            .record_result(Coord::new(0, 0), ShotOutcome::Miss)
            .unwrap();
        knowledge
            .record_result(Coord::new(5, 5), ShotOutcome::Hit)
            .unwrap();
        let mut rng = EngineRng::new(7);

        let placements = sampler().sample(&knowledge, 8, None, &mut rng).unwrap();
        assert!(!placements.is_empty());
        for placement in &placements {
            assert_consistent(placement, &knowledge);
            assert!(placement.covers(Coord::new(5, 5)));
            assert!(!placement.covers(Coord::new(0, 0)));
        }
    }

    #[test]
    fn test_fully_determined_ship() {
        // A single length-3 ship known to occupy (2,2)-(2,4); everything else
        // is a miss. Only one placement exists.
        let mut knowledge = BoardKnowledge::new(10, &[3]);
        let ship_cells = [Coord::new(2, 2), Coord::new(2, 3), Coord::new(2, 4)];
        for row in 0..10 {
            for col in 0..10 {
                let coord = Coord::new(row, col);
                if ship_cells.contains(&coord) {
                    knowledge.record_result(coord, ShotOutcome::Hit).unwrap();
                } else {
                    knowledge.record_result(coord, ShotOutcome::Miss).unwrap();
                }
            }
        }

        let mut rng = EngineRng::new(11);
        let placements = sampler().sample(&knowledge, 4, None, &mut rng).unwrap();

        assert!(!placements.is_empty());
        for placement in &placements {
            let ship = &placement.ships()[0];
            let cells: Vec<_> = ship.cells().collect();
            assert_eq!(cells, ship_cells.to_vec());
        }
    }

    #[test]
    fn test_contradictory_knowledge_exhausts() {
        // An isolated hit boxed in by misses on a board whose only ship has
        // length 2: no placement can cover it.
        let mut knowledge = BoardKnowledge::new(10, &[2]);
        knowledge
            .record_result(Coord::new(5, 5), ShotOutcome::Hit)
            .unwrap();
        for neighbor in [
            Coord::new(4, 5),
            Coord::new(5, 6),
            Coord::new(6, 5),
            Coord::new(5, 4),
        ] {
            knowledge.record_result(neighbor, ShotOutcome::Miss).unwrap();
        }

        let mut rng = EngineRng::new(3);
        let err = sampler().sample(&knowledge, 4, None, &mut rng).unwrap_err();
        assert!(err.attempts > 0);
    }

    #[test]
    fn test_sample_is_deterministic() {
        let knowledge = BoardKnowledge::new(10, &[5, 4, 3, 3, 2]);

        let mut rng1 = EngineRng::new(99);
        let mut rng2 = EngineRng::new(99);
        let a = sampler().sample(&knowledge, 8, None, &mut rng1).unwrap();
        let b = sampler().sample(&knowledge, 8, None, &mut rng2).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_zero_count() {
        let knowledge = BoardKnowledge::new(10, &[2]);
        let mut rng = EngineRng::new(1);
        let placements = sampler().sample(&knowledge, 0, None, &mut rng).unwrap();
        assert!(placements.is_empty());
    }

    #[test]
    fn test_lazy_iterator_stops_at_count() {
        let knowledge = BoardKnowledge::new(10, &[5, 4, 3, 3, 2]);
        let mut rng = EngineRng::new(5);
        let s = sampler();

        let taken: Vec<_> = s.iter(&knowledge, 3, None, &mut rng).collect();
        assert_eq!(taken.len(), 3);
    }

    #[test]
    fn test_enumerate_candidates_count() {
        // Length 3 on a 10-board: 10 rows * 8 starts per orientation.
        let candidates = enumerate_candidates(3, 10);
        assert_eq!(candidates.len(), 160);
        assert!(candidates.iter().all(|ship| ship.in_bounds(10)));
    }

    #[test]
    fn test_draw_uniform_in_bounds() {
        let mut rng = EngineRng::new(17);
        for _ in 0..200 {
            let ship = draw_uniform(4, 10, &mut rng).unwrap();
            assert!(ship.in_bounds(10));
        }
    }
}
