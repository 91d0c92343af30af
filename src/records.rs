//! Best-climb leaderboard
//!
//! Top 10 runs, persisted as a JSON file next to the tuning file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RecordsError;

/// Maximum number of runs to keep
pub const MAX_RECORDS: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbEntry {
    pub score: u64,
    /// Upward distance climbed (world units)
    pub height: f32,
    /// Run seed, so the run can be replayed
    pub seed: u64,
    /// Unix timestamp (ms)
    pub timestamp: f64,
}

/// Leaderboard sorted by score, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimbRecords {
    pub entries: Vec<ClimbEntry>,
}

impl ClimbRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-point runs never qualify
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_RECORDS {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// 1-indexed rank a score would get
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run; returns its rank or None if it didn't make the board.
    /// Ties rank below the earlier run.
    pub fn add_run(&mut self, entry: ClimbEntry) -> Option<usize> {
        let rank = self.potential_rank(entry.score)?;
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_RECORDS);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Missing file means a fresh board
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordsError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No climb records at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path)?;
        let mut records: ClimbRecords = serde_json::from_str(&json)?;
        records.entries.sort_by(|a, b| b.score.cmp(&a.score));
        records.entries.truncate(MAX_RECORDS);
        log::info!("Loaded {} climb records", records.entries.len());
        Ok(records)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Climb records saved ({} entries)", self.entries.len());
        Ok(())
    }
}
