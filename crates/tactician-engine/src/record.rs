//! A found tactic and the cursor tracking how much of it has been played.

use std::fmt;

use shakmaty::Move;
use tactician_core::{TacticKind, uci_line};

/// A forcing line that ends in a tactic, consumed one ply at a time.
///
/// The cursor always satisfies `0 <= index <= len`. Moves before the cursor
/// have been played on the board, starting at game ply `start_ply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TacticRecord {
    moves: Vec<Move>,
    kind: TacticKind,
    score: i32,
    index: usize,
    start_ply: usize,
}

impl TacticRecord {
    /// A record positioned before its first move.
    pub fn new(moves: Vec<Move>, kind: TacticKind, score: i32) -> TacticRecord {
        TacticRecord {
            moves,
            kind,
            score,
            index: 0,
            start_ply: 0,
        }
    }

    /// The same record, with its first move to be played at game ply `ply`.
    pub fn starting_at(mut self, ply: usize) -> TacticRecord {
        self.start_ply = ply;
        self
    }

    /// Game ply at which the first move is played.
    pub fn start_ply(&self) -> usize {
        self.start_ply
    }

    pub fn kind(&self) -> TacticKind {
        self.kind
    }

    /// Expected advantage in centipawns for the engine.
    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Number of moves already consumed.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The next expected move, without consuming it.
    pub fn peek(&self) -> Option<&Move> {
        self.moves.get(self.index)
    }

    /// Same as [`peek`](Self::peek); the move a trainee would be hinted.
    pub fn hint_move(&self) -> Option<&Move> {
        self.peek()
    }

    /// Consume and return the next move.
    pub fn next_move(&mut self) -> Option<Move> {
        let mv = self.moves.get(self.index)?.clone();
        self.index += 1;
        Some(mv)
    }

    /// Skip past the next move (the opponent played what was expected).
    pub fn advance(&mut self) {
        if self.index < self.moves.len() {
            self.index += 1;
        }
    }

    /// Every move has been played.
    pub fn is_complete(&self) -> bool {
        self.index == self.moves.len()
    }

    /// Full moves remaining, rounding a trailing half-move up.
    pub fn moves_left(&self) -> usize {
        (self.moves.len() - self.index).div_ceil(2)
    }

    /// Step the cursor back one move pair. Returns `false` when the cursor was
    /// already at the start and the record should be dropped.
    pub fn rewind(&mut self) -> bool {
        match self.index {
            0 => false,
            1 => {
                self.index = 0;
                true
            }
            _ => {
                self.index -= 2;
                true
            }
        }
    }
}

impl fmt::Display for TacticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in {} plies ({:+} cp): {}",
            self.kind,
            self.moves.len(),
            self.score,
            uci_line(&self.moves)
        )
    }
}
