//! Offline detector runs over move lines and puzzle corpora.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tactician_core::{Bitboard, Game, Move, Puzzle, TacticKind, TacticSet, parse_corpus, uci_text};
use tactician_engine::detect;
use tracing::{info, warn};

/// A detector hit after one move of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// 1-based index of the move that created the pattern.
    pub ply: usize,
    pub mv: Move,
    pub kind: TacticKind,
    pub squares: Bitboard,
}

/// Play `line` from `game` and run the enabled detectors after every move,
/// using the following move of the line as the victim's reply.
pub fn scan_line(game: &Game, line: &[Move], enabled: TacticSet) -> Result<Vec<Hit>> {
    let mut game = game.clone();
    let mut hits = Vec::new();
    for (i, mv) in line.iter().enumerate() {
        game.push(mv)
            .with_context(|| format!("move {} ({}) of the line", i + 1, uci_text(mv)))?;
        if let Some((kind, squares)) = detect(&game, line.get(i + 1), enabled) {
            hits.push(Hit {
                ply: i + 1,
                mv: mv.clone(),
                kind,
                squares,
            });
        }
    }
    Ok(hits)
}

/// Whether the solution line of `puzzle` shows the tactic it is labelled with.
///
/// Checkmate puzzles must end in mate. Other kinds must be flagged after one
/// of the solver's moves.
pub fn confirms(puzzle: &Puzzle) -> Result<bool> {
    if puzzle.kind == TacticKind::Checkmate {
        let mut game = puzzle.game.clone();
        for mv in &puzzle.solution {
            game.push(mv)?;
        }
        return Ok(game.is_checkmate());
    }

    let hits = scan_line(&puzzle.game, &puzzle.solution, TacticSet::only(puzzle.kind))?;
    // Solver moves sit at odd plies of the solution.
    Ok(hits.iter().any(|hit| hit.ply % 2 == 1))
}

fn squares_text(squares: Bitboard) -> String {
    squares
        .into_iter()
        .map(|sq| sq.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn run_line(fen: &str, moves: &[String], enabled: TacticSet) -> Result<()> {
    let game = Game::from_fen(fen).context("parsing --fen")?;
    let mut scratch = game.clone();
    let mut line = Vec::with_capacity(moves.len());
    for text in moves {
        line.push(scratch.push_uci(text).with_context(|| format!("move {text}"))?);
    }

    let hits = scan_line(&game, &line, enabled)?;
    info!(moves = line.len(), hits = hits.len(), "line scanned");
    if hits.is_empty() {
        println!("no tactics found");
    }
    for hit in &hits {
        println!(
            "{:>3}. {}  {}  [{}]",
            hit.ply,
            uci_text(&hit.mv),
            hit.kind,
            squares_text(hit.squares)
        );
    }
    Ok(())
}

pub fn run_corpus(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let puzzles = parse_corpus(&text).with_context(|| format!("parsing {}", path.display()))?;
    if puzzles.is_empty() {
        bail!("{} holds no puzzles", path.display());
    }

    let mut found = [0usize; TacticKind::COUNT];
    let mut confirmed = [0usize; TacticKind::COUNT];
    for (i, puzzle) in puzzles.iter().enumerate() {
        found[puzzle.kind.index()] += 1;
        if confirms(puzzle)? {
            confirmed[puzzle.kind.index()] += 1;
        } else {
            warn!(puzzle = i + 1, kind = %puzzle.kind, position = %puzzle.game, "tactic not detected");
        }
    }

    println!("{} puzzles", puzzles.len());
    for kind in TacticKind::ALL {
        let total = found[kind.index()];
        if total > 0 {
            println!("  {:<13} {}/{} confirmed", kind.name(), confirmed[kind.index()], total);
        }
    }
    Ok(())
}
