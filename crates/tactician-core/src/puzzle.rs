//! Puzzle corpus parsing.
//!
//! One puzzle per line: `kind,FEN,move move move...` where `kind` is a
//! [`TacticKind`] ordinal or name and the moves are in UCI notation. The first
//! move is the opponent's setup move; the rest is the solution. Blank lines and
//! lines starting with `#` are skipped.

use shakmaty::Move;

use crate::error::PuzzleError;
use crate::game::Game;
use crate::tactic::TacticKind;

/// A tactic puzzle, positioned after its setup move.
#[derive(Debug, Clone)]
pub struct Puzzle {
    /// The motif the puzzle demonstrates.
    pub kind: TacticKind,
    /// The game with the setup move already played.
    pub game: Game,
    /// The move that leads into the puzzle.
    pub setup: Move,
    /// The winning line from the puzzle position.
    pub solution: Vec<Move>,
}

impl Puzzle {
    /// The side solving the puzzle.
    pub fn solver(&self) -> shakmaty::Color {
        self.game.turn()
    }
}

/// Parse a single puzzle line.
pub fn parse_puzzle(line: &str) -> Result<Puzzle, PuzzleError> {
    let fields: Vec<&str> = line.trim().splitn(3, ',').collect();
    if fields.len() != 3 {
        return Err(PuzzleError::WrongFieldCount {
            found: fields.len(),
        });
    }

    let kind: TacticKind = fields[0].parse()?;
    let mut game = Game::from_fen(fields[1])?;

    let mut tokens = fields[2].split_whitespace();
    let setup = match tokens.next() {
        Some(text) => game.push_uci(text)?,
        None => return Err(PuzzleError::NoMoves),
    };

    let mut scratch = game.clone();
    let mut solution = Vec::new();
    for text in tokens {
        solution.push(scratch.push_uci(text)?);
    }

    Ok(Puzzle {
        kind,
        game,
        setup,
        solution,
    })
}

/// Parse a whole corpus, reporting the first bad line by its 1-based number.
pub fn parse_corpus(text: &str) -> Result<Vec<Puzzle>, PuzzleError> {
    let mut puzzles = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let puzzle = parse_puzzle(line).map_err(|err| PuzzleError::AtLine {
            line: i + 1,
            source: Box::new(err),
        })?;
        puzzles.push(puzzle);
    }
    Ok(puzzles)
}
