//! Opponent placement model: learned placement tendencies.
//!
//! A process-wide frequency table of where human opponents have historically
//! put their ships, keyed by (ship length, normalized position bucket,
//! orientation). It is loaded when the engine starts, read at the start of
//! each biased-sampling turn, updated with the opponent's final placement
//! when a game completes, and flushed back to disk.
//!
//! Lifecycle and locking are explicit: the table travels as a
//! `SharedPlacementModel` (`Arc<RwLock<_>>`) so turn-start reads may run
//! concurrently while the end-of-game write is exclusive.

use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Coord, Orientation};
use crate::placement::Placement;

/// Bands per axis when normalizing a position into a bucket.
pub const BUCKET_BANDS: u8 = 3;

/// Handle for sharing one model across concurrent games.
pub type SharedPlacementModel = Arc<RwLock<PlacementModel>>;

/// Error loading or saving a placement model file.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file could not be read or written")]
    Io(#[from] std::io::Error),
    #[error("model file is not valid")]
    Format(#[from] serde_json::Error),
}

/// A frequency-table key: ship length, coarse board region, orientation.
///
/// Positions are normalized into `BUCKET_BANDS` bands per axis so the table
/// stays small and board-size independent.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FrequencyKey {
    pub length: u8,
    pub row_band: u8,
    pub col_band: u8,
    pub orientation: Orientation,
}

impl FrequencyKey {
    /// Bucket a concrete ship start position on an N×N board.
    #[must_use]
    pub fn bucketed(length: u8, start: Coord, orientation: Orientation, board_size: u8) -> Self {
        Self {
            length,
            row_band: band(start.row, board_size),
            col_band: band(start.col, board_size),
            orientation,
        }
    }
}

fn band(pos: u8, board_size: u8) -> u8 {
    if board_size == 0 {
        return 0;
    }
    ((pos as u16 * BUCKET_BANDS as u16) / board_size as u16).min(BUCKET_BANDS as u16 - 1) as u8
}

/// Persisted frequency table of historical opponent ship placements.
///
/// Starts empty (uniform) when no prior file exists; merges with another
/// table by summing counts.
#[derive(Clone, Debug, Default)]
pub struct PlacementModel {
    counts: FxHashMap<FrequencyKey, u64>,
    games: u64,
}

/// On-disk representation: a sorted entry list, mergeable by summation.
#[derive(Serialize, Deserialize)]
struct StoredModel {
    games: u64,
    entries: Vec<(FrequencyKey, u64)>,
}

impl PlacementModel {
    /// Create an empty (uniform) model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed games recorded.
    #[must_use]
    pub fn games_recorded(&self) -> u64 {
        self.games
    }

    /// Whether the model holds no observations yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Observed count for a key.
    #[must_use]
    pub fn count(&self, key: FrequencyKey) -> u64 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Total observations for one ship length across all buckets.
    #[must_use]
    pub fn total_for_length(&self, length: u8) -> u64 {
        self.counts
            .iter()
            .filter(|(key, _)| key.length == length)
            .map(|(_, &count)| count)
            .sum()
    }

    /// Record a human opponent's final fleet placement at game end.
    pub fn record_fleet(&mut self, placement: &Placement, board_size: u8) {
        for ship in placement.ships() {
            let key = FrequencyKey::bucketed(ship.length, ship.start, ship.orientation, board_size);
            *self.counts.entry(key).or_insert(0) += 1;
        }
        self.games += 1;
    }

    /// Sampling weight for a candidate position.
    ///
    /// Mixes the uniform distribution with the model's Laplace-smoothed
    /// bucket frequency: `strength` 0 is exactly uniform, 1 follows the
    /// observed frequencies alone. An empty model yields 1.0 everywhere.
    #[must_use]
    pub fn weight(
        &self,
        length: u8,
        start: Coord,
        orientation: Orientation,
        board_size: u8,
        strength: f64,
    ) -> f64 {
        if strength <= 0.0 {
            return 1.0;
        }

        let key = FrequencyKey::bucketed(length, start, orientation, board_size);
        let count = self.count(key) as f64;
        let total = self.total_for_length(length) as f64;
        let buckets = f64::from(BUCKET_BANDS) * f64::from(BUCKET_BANDS) * 2.0;

        // Smoothed ratio of this bucket's share to the uniform share.
        let ratio = ((count + 1.0) * buckets) / (total + buckets);
        (1.0 - strength) + strength * ratio
    }

    /// Merge another model's observations into this one by summation.
    pub fn merge(&mut self, other: &PlacementModel) {
        for (&key, &count) in &other.counts {
            *self.counts.entry(key).or_insert(0) += count;
        }
        self.games += other.games;
    }

    /// Load a model from disk. A missing file is not an error: it yields an
    /// empty model, so the first run of a fresh install starts uniform.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        let stored: StoredModel = serde_json::from_str(&text)?;

        Ok(Self {
            counts: stored.entries.into_iter().collect(),
            games: stored.games,
        })
    }

    /// Persist the model to disk with stable (sorted) entry order.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let mut entries: Vec<(FrequencyKey, u64)> =
            self.counts.iter().map(|(&key, &count)| (key, count)).collect();
        entries.sort_unstable();

        let stored = StoredModel {
            games: self.games,
            entries,
        };
        let text = serde_json::to_string_pretty(&stored)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Wrap the model for cross-game sharing.
    #[must_use]
    pub fn shared(self) -> SharedPlacementModel {
        Arc::new(RwLock::new(self))
    }
}
