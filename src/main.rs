mod scan;
mod selfplay;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tactician_core::{Color, STARTING_FEN, TacticKind, TacticSet};
use tactician_engine::Difficulty;
use tracing::info;

/// Steer chess games toward instructive tactics.
#[derive(Debug, Parser)]
#[command(name = "tactician", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play the tactics engine against a plain UCI engine and count tactics.
    Selfplay(selfplay::SelfplayArgs),
    /// Replay a move line and report which tactics each move creates.
    Scan {
        /// Starting position.
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,
        /// Moves in UCI notation.
        #[arg(required = true)]
        moves: Vec<String>,
        /// Tactics to look for (comma-separated); all by default.
        #[arg(long, value_delimiter = ',', value_parser = parse_kind)]
        tactics: Vec<TacticKind>,
    },
    /// Load a puzzle corpus and check each solution against its tactic kind.
    Check {
        /// Corpus file: one `kind,FEN,moves` puzzle per line.
        corpus: PathBuf,
    },
}

/// A side of the board on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

fn parse_kind(s: &str) -> Result<TacticKind, String> {
    s.parse().map_err(|err| format!("{err}"))
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    s.parse().map_err(|err| format!("{err}"))
}

/// The enabled set for a possibly empty `--tactics` list.
fn tactic_set(kinds: &[TacticKind]) -> TacticSet {
    if kinds.is_empty() {
        TacticSet::ALL
    } else {
        kinds.iter().copied().collect()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    info!(command = ?cli.command, "tactician starting");

    match cli.command {
        Commands::Selfplay(args) => selfplay::run(&args),
        Commands::Scan { fen, moves, tactics } => scan::run_line(&fen, &moves, tactic_set(&tactics)),
        Commands::Check { corpus } => scan::run_corpus(&corpus),
    }
}
