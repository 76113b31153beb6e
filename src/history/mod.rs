//! Per-game performance records and difficulty recommendation.
//!
//! The surrounding application records one `GameRecord` per finished game;
//! `MatchHistory` persists the log as JSON, summarizes results per tier,
//! and recommends a difficulty from recent win rate. A missing history file
//! simply starts an empty log.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::strategy::Difficulty;

/// Window of recent games examined by the recommendation.
const RECENT_WINDOW: usize = 10;

/// Minimum games before recommendations move off the default.
const MIN_GAMES: usize = 5;

/// Error loading or saving a history file.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file could not be read or written")]
    Io(#[from] std::io::Error),
    #[error("history file is not valid")]
    Format(#[from] serde_json::Error),
}

/// Outcome and shot statistics of one finished game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecord {
    pub difficulty: Difficulty,
    /// Whether the human opponent won.
    pub player_won: bool,
    pub total_turns: u32,
    pub player_shots: u32,
    pub player_hits: u32,
    pub engine_shots: u32,
    pub engine_hits: u32,
    pub ships_sunk_by_player: u8,
    pub ships_sunk_by_engine: u8,
}

impl GameRecord {
    /// The human player's hit rate.
    #[must_use]
    pub fn player_accuracy(&self) -> f64 {
        if self.player_shots == 0 {
            0.0
        } else {
            f64::from(self.player_hits) / f64::from(self.player_shots)
        }
    }

    /// The engine's hit rate.
    #[must_use]
    pub fn engine_accuracy(&self) -> f64 {
        if self.engine_shots == 0 {
            0.0
        } else {
            f64::from(self.engine_hits) / f64::from(self.engine_shots)
        }
    }
}

/// Aggregate results for one difficulty tier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultySummary {
    pub games_played: u32,
    pub player_wins: u32,
    pub win_rate: f64,
    pub avg_player_accuracy: f64,
    pub avg_engine_accuracy: f64,
}

/// Append-only log of finished games.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MatchHistory {
    games: Vec<GameRecord>,
}

impl MatchHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether no games have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// All recorded games, oldest first.
    #[must_use]
    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    /// Record a finished game.
    pub fn push(&mut self, record: GameRecord) {
        self.games.push(record);
    }

    /// Append another history's games to this one.
    pub fn merge(&mut self, other: &MatchHistory) {
        self.games.extend(other.games.iter().cloned());
    }

    /// Aggregate results for one tier.
    #[must_use]
    pub fn summary_for(&self, difficulty: Difficulty) -> DifficultySummary {
        let games: Vec<&GameRecord> = self
            .games
            .iter()
            .filter(|g| g.difficulty == difficulty)
            .collect();

        if games.is_empty() {
            return DifficultySummary::default();
        }

        let total = games.len() as u32;
        let wins = games.iter().filter(|g| g.player_won).count() as u32;
        let n = games.len() as f64;

        DifficultySummary {
            games_played: total,
            player_wins: wins,
            win_rate: f64::from(wins) / n,
            avg_player_accuracy: games.iter().map(|g| g.player_accuracy()).sum::<f64>() / n,
            avg_engine_accuracy: games.iter().map(|g| g.engine_accuracy()).sum::<f64>() / n,
        }
    }

    /// Recommend a difficulty from recent performance.
    ///
    /// A player dominating the last `RECENT_WINDOW` games (win rate above
    /// 80%) steps up a tier; one struggling (below 20%) steps down;
    /// otherwise the last played tier stands. With fewer than `MIN_GAMES`
    /// recorded, Medium is the default for a new player.
    #[must_use]
    pub fn recommend(&self) -> Difficulty {
        if self.games.len() < MIN_GAMES {
            return Difficulty::Medium;
        }

        let recent: &[GameRecord] =
            &self.games[self.games.len().saturating_sub(RECENT_WINDOW)..];
        let wins = recent.iter().filter(|g| g.player_won).count();
        let win_rate = wins as f64 / recent.len() as f64;

        // recent is non-empty because of the MIN_GAMES check
        let last = recent[recent.len() - 1].difficulty;

        if win_rate > 0.8 {
            last.harder()
        } else if win_rate < 0.2 {
            last.easier()
        } else {
            last
        }
    }

    /// Load a history from disk; a missing file yields an empty log.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Persist the history to disk.
    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}
