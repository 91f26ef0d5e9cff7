//! Errors raised by the tactics engine.

use tactician_core::{CoreError, OracleError};

/// Errors that stop the engine from choosing or applying a move.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The oracle failed or has been shut down.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// A move or position was rejected by the rules engine.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The active tactic expects a move that is not legal on the board.
    #[error("tactic move {uci} is illegal in position {position}")]
    IllegalMove { uci: String, position: String },

    /// No move can be chosen because the game has ended.
    #[error("game is over: {position}")]
    GameOver { position: String },

    /// The engine was asked to move while it is the opponent's turn.
    #[error("not the engine's turn in position {position}")]
    NotEngineTurn { position: String },

    /// The oracle returned no lines for the position.
    #[error("oracle returned no analysis for {position}")]
    NoAnalysis { position: String },
}
