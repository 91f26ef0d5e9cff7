//! Core types for tactician: the history-keeping game, oracle interface,
//! tactic classification and puzzle corpus parsing.

mod error;
mod game;
mod oracle;
mod puzzle;
mod score;
mod tactic;
mod value;

pub use error::{CoreError, PuzzleError};
pub use game::{Game, STARTING_FEN, ScopedMove, uci_line, uci_text};
pub use oracle::{AnalysisLine, Limit, Oracle, OracleError, OracleOptions};
pub use puzzle::{Puzzle, parse_corpus, parse_puzzle};
pub use score::{MATE_SCORE, Score};
pub use tactic::{TacticKind, TacticSet};
pub use value::{PIECE_VALUES, piece_value, value_on};

pub use shakmaty::{Bitboard, Board, Chess, Color, Move, Piece, Role, Square};
