//! Integration tests for the per-turn move selector.

mod common;

use common::ScriptedOracle;
use tactician_core::{Color, Game, OracleError, Score, TacticKind, uci_text};
use tactician_engine::{Difficulty, EngineError, TacticsEngine};

const FORK_FEN: &str = "2r3k1/7p/8/3N4/8/8/8/4K3 w - - 0 1";
const BACK_RANK_FEN: &str = "6k1/5ppp/8/8/8/8/8/3RK3 w - - 0 1";

fn engine(fen: &str, oracle: ScriptedOracle) -> TacticsEngine<ScriptedOracle> {
    let game = Game::from_fen(fen).unwrap();
    TacticsEngine::new(oracle, game, Color::White)
}

/// An engine that has just started the Ke2 h6 Ne7+ fork.
fn engine_in_fork() -> TacticsEngine<ScriptedOracle> {
    let oracle = ScriptedOracle::new()
        .script("", &[("e1e2", Score::Cp(300)), ("e1d2", Score::Cp(290))])
        .script(
            "e1e2",
            &[("h7h6 d5e7 g8h7", Score::Cp(-400)), ("g8f8", Score::Cp(-700))],
        );
    let mut engine = engine(FORK_FEN, oracle);
    let mv = engine.play_move().unwrap();
    assert_eq!(uci_text(&mv), "e1e2");
    engine
}

fn opponent_plays(engine: &mut TacticsEngine<ScriptedOracle>, text: &str) {
    let mv = engine.game().parse_uci(text).unwrap();
    engine.apply_move(&mv).unwrap();
}

// ── Shortcuts ─────────────────────────────────────────────────────────────────

#[test]
fn forced_mate_skips_search() {
    let oracle = ScriptedOracle::new().script("", &[("d1d8", Score::Mate(1)), ("e1e2", Score::Cp(0))]);
    let mut engine = engine(BACK_RANK_FEN, oracle);

    let mv = engine.play_move().unwrap();
    assert_eq!(uci_text(&mv), "d1d8");
    assert_eq!(engine.oracle().calls(), 1);
    assert!(engine.game().is_checkmate());
}

#[test]
fn only_move_skips_search() {
    let oracle = ScriptedOracle::new().script("", &[("e1e2", Score::Cp(50)), ("e1d2", Score::Cp(-300))]);
    let mut engine = engine(FORK_FEN, oracle);

    let mv = engine.play_move().unwrap();
    assert_eq!(uci_text(&mv), "e1e2");
    assert_eq!(engine.oracle().calls(), 1);
    assert!(engine.current_tactic().is_none());
}

#[test]
fn root_requests_at_least_two_lines() {
    let oracle = ScriptedOracle::new().script("", &[("e1e2", Score::Cp(50)), ("e1d2", Score::Cp(-300))]);
    let mut engine = engine(FORK_FEN, oracle);
    engine.set_difficulty(Difficulty::Hard);
    engine.play_move().unwrap();
    assert_eq!(engine.oracle().requests[0].1, 2);
}

// ── Tactic lifecycle ──────────────────────────────────────────────────────────

#[test]
fn search_starts_tactic() {
    let engine = engine_in_fork();
    let record = engine.current_tactic().expect("a tactic should be active");
    assert_eq!(record.kind(), TacticKind::Fork);
    assert_eq!(record.len(), 3);
    assert_eq!(record.index(), 1);
    assert_eq!(record.moves_left(), 1);
    assert_eq!(engine.hint_move().map(uci_text).as_deref(), Some("h7h6"));
    // Selector root, search root, and Black's forced reply.
    assert_eq!(engine.oracle().calls(), 3);
}

#[test]
fn tactic_is_played_to_completion() {
    let mut engine = engine_in_fork();
    opponent_plays(&mut engine, "h7h6");

    let mv = engine.play_move().unwrap();
    assert_eq!(uci_text(&mv), "d5e7");
    assert!(engine.current_tactic().is_none());
}

#[test]
fn deviation_drops_tactic() {
    let mut engine = engine_in_fork();
    opponent_plays(&mut engine, "g8f8");

    let calls = engine.oracle().calls();
    let mv = engine.play_move().unwrap();
    assert!(engine.current_tactic().is_none());
    // Root analysis plus a fresh search, not a replayed tactic move.
    assert!(engine.oracle().calls() > calls + 1);
    assert!(engine.oracle().requests.iter().any(|(key, _)| key == "e1e2 g8f8"));
    assert_eq!(engine.game().last_move(), Some(&mv));
    assert_eq!(engine.game().ply(), 3);
}

#[test]
fn undo_restores_cursor() {
    let mut engine = engine_in_fork();
    opponent_plays(&mut engine, "h7h6");

    assert_eq!(engine.undo_tactic_move(), 2);
    assert_eq!(engine.game().ply(), 0);
    let record = engine.current_tactic().expect("tactic survives one undo");
    assert_eq!(record.index(), 0);
    assert_eq!(engine.hint_move().map(uci_text).as_deref(), Some("e1e2"));

    assert_eq!(engine.undo_tactic_move(), 0);
    assert!(engine.current_tactic().is_none());
}

#[test]
fn undo_on_opponent_turn_before_tactic_start_drops_it() {
    // Same fork, reached after Black's first move.
    let oracle = ScriptedOracle::new()
        .script("a8c8", &[("e1e2", Score::Cp(300)), ("e1d2", Score::Cp(290))])
        .script(
            "a8c8 e1e2",
            &[("h7h6 d5e7 g8h7", Score::Cp(-400)), ("g8f8", Score::Cp(-700))],
        );
    let game = Game::from_fen("r5k1/7p/8/3N4/8/8/8/4K3 b - - 0 1").unwrap();
    let mut engine = TacticsEngine::new(oracle, game, Color::White);
    opponent_plays(&mut engine, "a8c8");

    let mv = engine.play_move().unwrap();
    assert_eq!(uci_text(&mv), "e1e2");
    let record = engine.current_tactic().expect("a tactic should be active");
    assert_eq!(record.start_ply(), 1);

    assert_eq!(engine.undo_tactic_move(), 2);
    assert_eq!(engine.game().ply(), 0);
    assert!(engine.current_tactic().is_none());

    opponent_plays(&mut engine, "g8f8");
    let mv = engine.play_move().unwrap();
    assert_eq!(engine.game().last_move(), Some(&mv));
    assert_eq!(engine.game().ply(), 2);
}

#[test]
fn undo_then_replay_resumes_tactic() {
    let mut engine = engine_in_fork();
    opponent_plays(&mut engine, "h7h6");
    engine.undo_tactic_move();

    let calls = engine.oracle().calls();
    let mv = engine.play_move().unwrap();
    assert_eq!(uci_text(&mv), "e1e2");
    // Only the root analysis; the move came from the kept tactic.
    assert_eq!(engine.oracle().calls(), calls + 1);
    assert_eq!(engine.current_tactic().map(|r| r.index()), Some(1));
}

// ── Errors and lifecycle ──────────────────────────────────────────────────────

#[test]
fn closed_engine_reports_terminated_oracle() {
    let mut engine = engine(FORK_FEN, ScriptedOracle::new());
    engine.close();
    assert!(engine.oracle().is_terminated());
    let err = engine.play_move().unwrap_err();
    assert!(matches!(err, EngineError::Oracle(OracleError::Terminated)));
}

#[test]
fn game_over_is_an_error() {
    let game = Game::from_fen("3R2k1/5ppp/8/8/8/8/8/4K3 b - - 1 1").unwrap();
    let mut engine = TacticsEngine::new(ScriptedOracle::new(), game, Color::Black);
    assert!(matches!(engine.play_move(), Err(EngineError::GameOver { .. })));
}

#[test]
fn illegal_opponent_move_is_rejected() {
    let mut engine = engine(FORK_FEN, ScriptedOracle::new());
    let mv = Game::new().parse_uci("e2e4").unwrap();
    assert!(matches!(engine.apply_move(&mv), Err(EngineError::Core(_))));
    assert_eq!(engine.game().ply(), 0);
}

#[test]
fn reset_discards_tactic() {
    let mut engine = engine_in_fork();
    engine.reset(Game::new(), Color::Black);
    assert!(engine.current_tactic().is_none());
    assert_eq!(engine.engine_color(), Color::Black);
    assert_eq!(engine.game().ply(), 0);
}

#[test]
fn difficulty_replaces_config() {
    let mut engine = engine(FORK_FEN, ScriptedOracle::new());
    engine.set_difficulty(Difficulty::Easy);
    assert_eq!(engine.difficulty(), Difficulty::Easy);
    assert_eq!(engine.config().num_pv, 5);
}
