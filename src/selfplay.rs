//! Self-play evaluation: the tactics engine against a plain UCI engine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tactician_core::{Game, Limit, Oracle, OracleOptions, STARTING_FEN, TacticKind, uci_text};
use tactician_engine::{Difficulty, TacticsEngine, detect};
use tactician_uci::UciOracle;
use tracing::{debug, info};

use crate::{Side, parse_difficulty, parse_kind, tactic_set};

#[derive(Debug, Args)]
pub struct SelfplayArgs {
    /// Path to the UCI engine used as the oracle and as the opponent.
    #[arg(long, default_value = "stockfish")]
    engine: PathBuf,
    /// Starting position.
    #[arg(long, default_value = STARTING_FEN)]
    fen: String,
    /// Side the tactics engine plays.
    #[arg(long, value_enum, default_value_t = Side::White)]
    color: Side,
    /// easy, medium or hard.
    #[arg(long, default_value = "medium", value_parser = parse_difficulty)]
    difficulty: Difficulty,
    /// Tactics to steer toward (comma-separated); all by default.
    #[arg(long, value_delimiter = ',', value_parser = parse_kind)]
    tactics: Vec<TacticKind>,
    /// Opponent search depth.
    #[arg(long, default_value_t = 8)]
    opponent_depth: u8,
    /// Opponent time per move in milliseconds.
    #[arg(long, default_value_t = 1000)]
    opponent_ms: u64,
    /// Stop after this many plies.
    #[arg(long, default_value_t = 300)]
    max_plies: usize,
    /// Engine threads; all logical cores by default.
    #[arg(long)]
    threads: Option<usize>,
    /// Engine hash table size in MiB.
    #[arg(long, default_value_t = 16)]
    hash: usize,
    /// Let the plain engine play both sides, for a baseline count.
    #[arg(long)]
    baseline: bool,
}

impl SelfplayArgs {
    fn oracle_options(&self) -> OracleOptions {
        let mut options = OracleOptions::from_available_cores();
        if let Some(threads) = self.threads {
            options.threads = threads.max(1);
        }
        options.hash_mb = self.hash;
        options
    }
}

/// Detector hits over one game.
#[derive(Debug, Default)]
struct Tally {
    plies: usize,
    hits: [usize; TacticKind::COUNT],
    tactics_started: usize,
}

impl Tally {
    fn total(&self) -> usize {
        self.hits.iter().sum()
    }
}

fn spawn(path: &Path, options: &OracleOptions) -> Result<UciOracle> {
    let mut oracle = UciOracle::spawn(path).with_context(|| format!("starting {}", path.display()))?;
    oracle.configure(options).context("configuring engine")?;
    Ok(oracle)
}

pub fn run(args: &SelfplayArgs) -> Result<()> {
    let game = Game::from_fen(&args.fen).context("parsing --fen")?;
    let tactics = tactic_set(&args.tactics);
    let color = args.color.into();
    let opponent_limit = Limit {
        depth: Some(args.opponent_depth),
        time: Some(Duration::from_millis(args.opponent_ms)),
    };

    let options = args.oracle_options();
    let mut opponent = spawn(&args.engine, &options)?;
    let mut engine = TacticsEngine::new(spawn(&args.engine, &options)?, game, color);
    engine.set_difficulty(args.difficulty);
    engine.set_tactic_types(tactics);
    info!(
        difficulty = %args.difficulty,
        tactics = %tactics,
        baseline = args.baseline,
        "self-play starting"
    );

    let mut tally = Tally::default();
    while tally.plies < args.max_plies && !engine.game().is_game_over() {
        let engine_turn = engine.game().turn() == color && !args.baseline;
        if engine_turn {
            let was_active = engine.current_tactic().is_some();
            let mv = engine.play_move().context("tactics engine move")?;
            if !was_active {
                if let Some(record) = engine.current_tactic() {
                    tally.tactics_started += 1;
                    info!(%record, "tactic started");
                }
            }
            debug!(mv = %uci_text(&mv), "tactics engine played");
        } else {
            let mv = opponent
                .play(engine.game(), &opponent_limit)
                .context("opponent move")?;
            engine.apply_move(&mv)?;
            debug!(mv = %uci_text(&mv), "opponent played");
        }
        tally.plies += 1;

        if let Some((kind, squares)) = detect(engine.game(), None, tactics) {
            tally.hits[kind.index()] += 1;
            info!(ply = tally.plies, %kind, targets = squares.count(), "tactic on board");
        }
    }

    let outcome = engine.game().outcome();
    engine.close();
    opponent.quit();

    info!(outcome = ?outcome, plies = tally.plies, "game finished");
    println!("plies: {}", tally.plies);
    match outcome {
        Some(outcome) => println!("result: {outcome}"),
        None => println!("result: unfinished"),
    }
    println!("tactics started: {}", tally.tactics_started);
    println!("tactic positions: {}", tally.total());
    for kind in TacticKind::ALL {
        println!("  {:<13} {}", kind.name(), tally.hits[kind.index()]);
    }
    Ok(())
}
