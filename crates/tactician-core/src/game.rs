//! A chess position together with the moves that led to it.
//!
//! [`Game`] keeps a snapshot of every earlier position, so a move can always
//! be taken back exactly. Exploration code either clones the game
//! ([`Game::child`]) or borrows it through a [`ScopedMove`] guard that undoes
//! the move when dropped.

use std::fmt;
use std::ops::Deref;

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{Board, CastlingMode, Chess, Color, Move, Outcome, Position};

use crate::error::CoreError;

/// The FEN string for the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A position and the move that was played from it.
#[derive(Clone, Debug)]
struct Snapshot {
    position: Chess,
    mv: Move,
}

/// A position with full move history back to a root FEN.
#[derive(Clone, Debug)]
pub struct Game {
    /// FEN of the position the history starts from.
    root_fen: String,
    /// Earlier positions, oldest first, each paired with the move played from it.
    history: Vec<Snapshot>,
    /// The current position.
    position: Chess,
}

impl Game {
    /// Start a game from the standard starting position.
    pub fn new() -> Game {
        Game {
            root_fen: STARTING_FEN.to_string(),
            history: Vec::new(),
            position: Chess::default(),
        }
    }

    /// Start a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Game, CoreError> {
        let fen = fen.trim();
        let parsed: Fen = fen.parse().map_err(|err| CoreError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{err}"),
        })?;
        let position: Chess =
            parsed
                .into_position(CastlingMode::Standard)
                .map_err(|err| CoreError::InvalidFen {
                    fen: fen.to_string(),
                    reason: format!("{err}"),
                })?;
        Ok(Game {
            root_fen: fen.to_string(),
            history: Vec::new(),
            position,
        })
    }

    /// The FEN the history starts from.
    pub fn root_fen(&self) -> &str {
        &self.root_fen
    }

    /// The current position.
    #[inline]
    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// The current piece placement.
    #[inline]
    pub fn board(&self) -> &Board {
        self.position.board()
    }

    /// The position one ply earlier, if any move has been played.
    pub fn previous(&self) -> Option<&Chess> {
        self.history.last().map(|snapshot| &snapshot.position)
    }

    /// The side to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// The most recently played move.
    pub fn last_move(&self) -> Option<&Move> {
        self.history.last().map(|snapshot| &snapshot.mv)
    }

    /// Number of plies played since the root position.
    #[inline]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Moves played since the root position, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = &Move> {
        self.history.iter().map(|snapshot| &snapshot.mv)
    }

    /// All legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves().into_iter().collect()
    }

    /// Return `true` if `mv` is legal in the current position.
    pub fn is_legal(&self, mv: &Move) -> bool {
        self.position.legal_moves().contains(mv)
    }

    /// Return `true` if the game has ended (mate, stalemate, insufficient material).
    pub fn is_game_over(&self) -> bool {
        self.position.is_game_over()
    }

    /// Return `true` if the side to move is checkmated.
    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    /// The result of the game, if it has ended.
    pub fn outcome(&self) -> Option<Outcome> {
        self.position.outcome()
    }

    /// Play a legal move.
    pub fn push(&mut self, mv: &Move) -> Result<(), CoreError> {
        if !self.is_legal(mv) {
            return Err(CoreError::IllegalMove {
                uci: uci_text(mv),
                position: self.to_string(),
            });
        }
        let before = self.position.clone();
        self.position.play_unchecked(mv);
        self.history.push(Snapshot {
            position: before,
            mv: mv.clone(),
        });
        Ok(())
    }

    /// Parse a UCI move, play it, and return it.
    pub fn push_uci(&mut self, text: &str) -> Result<Move, CoreError> {
        let mv = self.parse_uci(text)?;
        self.push(&mv)?;
        Ok(mv)
    }

    /// Take back the last move, restoring the previous position exactly.
    pub fn pop(&mut self) -> Option<Move> {
        let snapshot = self.history.pop()?;
        self.position = snapshot.position;
        Some(snapshot.mv)
    }

    /// Return a copy of this game with `mv` played.
    pub fn child(&self, mv: &Move) -> Result<Game, CoreError> {
        let mut child = self.clone();
        child.push(mv)?;
        Ok(child)
    }

    /// Play `mv` and return a guard that takes it back when dropped.
    pub fn scoped(&mut self, mv: &Move) -> Result<ScopedMove<'_>, CoreError> {
        self.push(mv)?;
        Ok(ScopedMove { game: self })
    }

    /// Run `f` on the position after `mv`; the move is always taken back.
    pub fn with_move<R>(&mut self, mv: &Move, f: impl FnOnce(&Game) -> R) -> Result<R, CoreError> {
        let scoped = self.scoped(mv)?;
        Ok(f(&scoped))
    }

    /// Parse a UCI move (e.g. `e2e4`, `e7e8q`) in the current position.
    pub fn parse_uci(&self, text: &str) -> Result<Move, CoreError> {
        let parsed: UciMove = text.parse().map_err(|_| CoreError::InvalidMoveText {
            text: text.to_string(),
        })?;
        parsed
            .to_move(&self.position)
            .map_err(|_| CoreError::IllegalMove {
                uci: text.to_string(),
                position: self.to_string(),
            })
    }

    /// Parse a space-separated UCI line, stopping at the first move that
    /// does not apply. The game itself is left untouched.
    pub fn parse_uci_line<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) -> Vec<Move> {
        let mut scratch = self.clone();
        let mut moves = Vec::new();
        for token in tokens {
            match scratch.push_uci(token) {
                Ok(mv) => moves.push(mv),
                Err(_) => break,
            }
        }
        moves
    }

    /// The moves since the root in UCI notation.
    pub fn uci_moves(&self) -> Vec<String> {
        self.moves().map(uci_text).collect()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root_fen)?;
        if !self.history.is_empty() {
            write!(f, " moves {}", uci_line(self.moves()))?;
        }
        Ok(())
    }
}

/// A move played on a borrowed [`Game`], taken back when the guard is dropped.
pub struct ScopedMove<'a> {
    game: &'a mut Game,
}

impl Deref for ScopedMove<'_> {
    type Target = Game;

    fn deref(&self) -> &Game {
        self.game
    }
}

impl Drop for ScopedMove<'_> {
    fn drop(&mut self) {
        self.game.pop();
    }
}

/// Format a move in UCI notation.
pub fn uci_text(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// Join moves into a space-separated UCI line.
pub fn uci_line<'a>(moves: impl IntoIterator<Item = &'a Move>) -> String {
    moves.into_iter().map(uci_text).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Square;

    #[test]
    fn starting_position_has_20_moves() {
        let game = Game::new();
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.turn(), Color::White);
        assert!(game.previous().is_none());
    }

    #[test]
    fn push_and_pop_restore_position() {
        let mut game = Game::new();
        let before = game.board().clone();
        let mv = game.push_uci("e2e4").unwrap();
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.last_move(), Some(&mv));
        assert_eq!(game.previous().map(|pos| pos.board()), Some(&before));

        assert_eq!(game.pop(), Some(mv));
        assert_eq!(game.board(), &before);
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.ply(), 0);
    }

    #[test]
    fn pop_on_root_is_none() {
        let mut game = Game::new();
        assert!(game.pop().is_none());
    }

    #[test]
    fn illegal_move_rejected() {
        let mut game = Game::new();
        let err = game.push_uci("e2e5").unwrap_err();
        assert!(matches!(err, CoreError::IllegalMove { .. }));
        assert_eq!(game.ply(), 0);
    }

    #[test]
    fn malformed_move_text_rejected() {
        let game = Game::new();
        let err = game.parse_uci("hello").unwrap_err();
        assert!(matches!(err, CoreError::InvalidMoveText { .. }));
    }

    #[test]
    fn invalid_fen_rejected() {
        let err = Game::from_fen("not a fen").unwrap_err();
        assert!(matches!(err, CoreError::InvalidFen { .. }));
    }

    #[test]
    fn scoped_move_is_taken_back() {
        let mut game = Game::new();
        let mv = game.parse_uci("g1f3").unwrap();
        {
            let scoped = game.scoped(&mv).unwrap();
            assert_eq!(scoped.ply(), 1);
            assert_eq!(
                scoped.board().role_at(Square::F3),
                Some(shakmaty::Role::Knight)
            );
        }
        assert_eq!(game.ply(), 0);
        assert!(game.board().piece_at(Square::F3).is_none());
    }

    #[test]
    fn with_move_returns_closure_result() {
        let mut game = Game::new();
        let mv = game.parse_uci("e2e4").unwrap();
        let replies = game.with_move(&mv, |after| after.legal_moves().len()).unwrap();
        assert_eq!(replies, 20);
        assert_eq!(game.ply(), 0);
    }

    #[test]
    fn child_leaves_parent_untouched() {
        let game = Game::new();
        let mv = game.parse_uci("d2d4").unwrap();
        let child = game.child(&mv).unwrap();
        assert_eq!(child.ply(), 1);
        assert_eq!(game.ply(), 0);
    }

    #[test]
    fn parse_uci_line_stops_at_illegal_move() {
        let game = Game::new();
        let moves = game.parse_uci_line("e2e4 e7e5 e4e5 g1f3".split_whitespace());
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn display_lists_moves_after_root() {
        let mut game = Game::new();
        game.push_uci("e2e4").unwrap();
        game.push_uci("c7c5").unwrap();
        assert_eq!(format!("{game}"), format!("{STARTING_FEN} moves e2e4 c7c5"));
        assert_eq!(game.uci_moves(), vec!["e2e4", "c7c5"]);
    }

    #[test]
    fn checkmate_is_game_over() {
        let mut game = Game::new();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.push_uci(text).unwrap();
        }
        assert!(game.is_checkmate());
        assert!(game.is_game_over());
        assert!(game.outcome().is_some());
    }
}
