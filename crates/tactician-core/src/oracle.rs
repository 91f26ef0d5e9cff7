//! The evaluation oracle interface consumed by the tactics engine.
//!
//! Any UCI engine can sit behind [`Oracle`]; the engine crate only ever talks
//! to this trait, so tests can substitute a scripted implementation.

use std::error::Error;
use std::time::Duration;

use shakmaty::Move;

use crate::game::Game;
use crate::score::Score;

/// Errors returned by an [`Oracle`].
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The oracle was shut down; no further queries are possible.
    #[error("oracle has been terminated")]
    Terminated,

    /// The oracle answered an analysis request with no lines.
    #[error("oracle returned no analysis for {position}")]
    NoAnalysis { position: String },

    /// The oracle did not produce a move to play.
    #[error("oracle returned no best move for {position}")]
    NoBestMove { position: String },

    /// A failure in the backend driving the oracle.
    #[error(transparent)]
    Backend(Box<dyn Error + Send + Sync>),
}

/// Resource settings passed to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleOptions {
    /// Search threads.
    pub threads: usize,
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
}

impl OracleOptions {
    /// Options using every logical core the host reports.
    pub fn from_available_cores() -> OracleOptions {
        let threads = std::thread::available_parallelism().map_or(1, |n| n.get());
        OracleOptions {
            threads,
            ..OracleOptions::default()
        }
    }
}

impl Default for OracleOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            hash_mb: 16,
        }
    }
}

/// How long the oracle may think about one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limit {
    /// Maximum search depth in plies.
    pub depth: Option<u8>,
    /// Maximum wall-clock time.
    pub time: Option<Duration>,
}

impl Limit {
    /// A depth-only limit.
    pub const fn depth(depth: u8) -> Limit {
        Limit {
            depth: Some(depth),
            time: None,
        }
    }
}

/// One principal variation returned by the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisLine {
    /// Moves starting from the analysed position. Never empty.
    pub pv: Vec<Move>,
    /// Evaluation relative to the side to move in the analysed position.
    pub score: Score,
}

impl AnalysisLine {
    /// The first move of the line.
    #[inline]
    pub fn first(&self) -> Option<&Move> {
        self.pv.first()
    }
}

/// A chess engine that evaluates positions.
pub trait Oracle {
    /// Apply resource settings.
    fn configure(&mut self, options: &OracleOptions) -> Result<(), OracleError>;

    /// Return up to `lines` principal variations for the game's current
    /// position, best first.
    fn analyse(
        &mut self,
        game: &Game,
        limit: &Limit,
        lines: usize,
    ) -> Result<Vec<AnalysisLine>, OracleError>;

    /// Return the move the oracle would play.
    fn play(&mut self, game: &Game, limit: &Limit) -> Result<Move, OracleError>;

    /// Shut the oracle down. Later queries return [`OracleError::Terminated`].
    fn quit(&mut self);
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn configure(&mut self, options: &OracleOptions) -> Result<(), OracleError> {
        (**self).configure(options)
    }

    fn analyse(
        &mut self,
        game: &Game,
        limit: &Limit,
        lines: usize,
    ) -> Result<Vec<AnalysisLine>, OracleError> {
        (**self).analyse(game, limit, lines)
    }

    fn play(&mut self, game: &Game, limit: &Limit) -> Result<Move, OracleError> {
        (**self).play(game, limit)
    }

    fn quit(&mut self) {
        (**self).quit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = OracleOptions::default();
        assert_eq!(options.threads, 1);
        assert_eq!(options.hash_mb, 16);
    }

    #[test]
    fn available_cores_is_at_least_one() {
        let options = OracleOptions::from_available_cores();
        assert!(options.threads >= 1);
        assert_eq!(options.hash_mb, 16);
    }

    #[test]
    fn depth_limit() {
        let limit = Limit::depth(12);
        assert_eq!(limit.depth, Some(12));
        assert!(limit.time.is_none());
    }

    #[test]
    fn backend_error_is_transparent() {
        let err = OracleError::Backend("pipe closed".into());
        assert_eq!(err.to_string(), "pipe closed");
        assert_eq!(OracleError::Terminated.to_string(), "oracle has been terminated");
    }
}
