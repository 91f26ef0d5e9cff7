//! Difficulty tiers and the tuning knobs they expand into.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tactician_core::{Limit, MATE_SCORE};

/// How hard the engine plays while steering toward tactics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// All tiers from easiest to hardest.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a difficulty name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty \"{0}\" (expected easy, medium or hard)")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseDifficultyError(s.to_string()))
    }
}

/// Tuning for one engine instance. All scores are centipawns from the
/// engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyConfig {
    /// Candidate lines requested on the engine's turn past the mistake window.
    pub num_pv: usize,
    /// Oracle search depth per query.
    pub oracle_depth: u8,
    /// Oracle wall-clock cap per query.
    pub oracle_time: Duration,
    /// Plies the tactic search may look ahead.
    pub search_depth: usize,
    /// Search depths up to this one consider every legal engine move.
    pub mistake_window: usize,
    /// How far below the best line an engine move may fall inside the mistake window.
    pub mistake_tolerance: i32,
    /// The same tolerance past the mistake window.
    pub continuation_tolerance: i32,
    /// The opponent's second-best reply must be this much worse for a reply to count as forced.
    pub forcing_margin: i32,
    /// A detected tactic must leave the engine at least this far ahead.
    pub advantage_threshold: i32,
    /// A best move this far ahead of the second is played without searching.
    pub obvious_margin: i32,
    /// Scores at or beyond this are treated as forced mate.
    pub mate_threshold: i32,
    /// Magnitude mate scores saturate to.
    pub mate_score: i32,
    /// Maximum oracle queries per tactic search.
    pub query_budget: usize,
}

impl DifficultyConfig {
    /// The oracle limit for one query.
    pub fn limit(&self) -> Limit {
        Limit {
            depth: Some(self.oracle_depth),
            time: Some(self.oracle_time),
        }
    }
}

impl From<Difficulty> for DifficultyConfig {
    fn from(difficulty: Difficulty) -> Self {
        let (num_pv, oracle_depth, search_depth, mistake_tolerance, advantage_threshold) = match difficulty {
            Difficulty::Easy => (5, 8, 12, 400, 250),
            Difficulty::Medium => (3, 12, 8, 300, 200),
            Difficulty::Hard => (1, 16, 4, 250, 200),
        };
        Self {
            num_pv,
            oracle_depth,
            oracle_time: Duration::from_secs(10),
            search_depth,
            mistake_window: 2,
            mistake_tolerance,
            continuation_tolerance: 30,
            forcing_margin: 150,
            advantage_threshold,
            obvious_margin: 200,
            mate_threshold: 10_000,
            mate_score: MATE_SCORE,
            query_budget: 256,
        }
    }
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Difficulty::default().into()
    }
}
