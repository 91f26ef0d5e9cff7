//! Error types for position setup, move text and puzzle parsing.

/// Errors raised by [`Game`](crate::Game) when parsing or playing moves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The FEN string could not be parsed or describes an impossible position.
    #[error("invalid FEN \"{fen}\": {reason}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
        /// Why the rules engine rejected it.
        reason: String,
    },

    /// The text is not a syntactically valid UCI move.
    #[error("invalid move text: \"{text}\"")]
    InvalidMoveText {
        /// The offending text.
        text: String,
    },

    /// The move is well-formed but not legal in the current position.
    #[error("illegal move {uci} in position {position}")]
    IllegalMove {
        /// The move in UCI notation.
        uci: String,
        /// The position, as root FEN plus moves played since.
        position: String,
    },
}

/// Errors that occur when loading a puzzle corpus.
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    /// A line does not have the `kind,fen,moves` shape.
    #[error("expected 3 comma-separated fields, found {found}")]
    WrongFieldCount {
        /// Number of fields found.
        found: usize,
    },

    /// The tactic kind field is not a known ordinal or name.
    #[error("invalid tactic kind: \"{found}\"")]
    InvalidKind {
        /// The invalid field.
        found: String,
    },

    /// The move list is empty, so there is no setup move.
    #[error("puzzle has no moves")]
    NoMoves,

    /// The FEN or one of the moves was rejected.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Wraps another error with the 1-based corpus line it came from.
    #[error("line {line}: {source}")]
    AtLine {
        /// 1-based line number in the corpus.
        line: usize,
        /// The underlying error.
        #[source]
        source: Box<PuzzleError>,
    },
}
