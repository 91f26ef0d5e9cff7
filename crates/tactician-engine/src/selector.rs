//! The per-turn move selector.
//!
//! Each turn the engine plays, in order of preference: a forced mate, an
//! obvious only move, the next move of the tactic it is already playing, the
//! first move of a newly found tactic, or a deliberately modest fallback move.

use shakmaty::{Color, Move};
use tactician_core::{AnalysisLine, Game, Oracle, Score, TacticSet, uci_text};
use tracing::{debug, info};

use crate::config::{Difficulty, DifficultyConfig};
use crate::error::EngineError;
use crate::record::TacticRecord;
use crate::search::TacticSearch;

/// A training opponent that steers the game toward tactics.
pub struct TacticsEngine<O: Oracle> {
    oracle: O,
    game: Game,
    engine_color: Color,
    difficulty: Difficulty,
    config: DifficultyConfig,
    tactics: TacticSet,
    record: Option<TacticRecord>,
}

impl<O: Oracle> TacticsEngine<O> {
    /// Create an engine playing `engine_color` in `game` at medium difficulty
    /// with every tactic enabled.
    pub fn new(oracle: O, game: Game, engine_color: Color) -> Self {
        Self {
            oracle,
            game,
            engine_color,
            difficulty: Difficulty::default(),
            config: DifficultyConfig::default(),
            tactics: TacticSet::default(),
            record: None,
        }
    }

    /// The game as the engine sees it.
    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn engine_color(&self) -> Color {
        self.engine_color
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    /// Switch tiers, replacing the whole configuration.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.config = difficulty.into();
    }

    /// Replace the configuration directly, keeping the difficulty label.
    pub fn set_config(&mut self, config: DifficultyConfig) {
        self.config = config;
    }

    pub fn tactic_types(&self) -> TacticSet {
        self.tactics
    }

    pub fn set_tactic_types(&mut self, tactics: TacticSet) {
        self.tactics = tactics;
    }

    /// The tactic currently being played, if any.
    pub fn current_tactic(&self) -> Option<&TacticRecord> {
        self.record.as_ref()
    }

    /// The next move of the active tactic.
    pub fn hint_move(&self) -> Option<&Move> {
        self.record.as_ref().and_then(TacticRecord::hint_move)
    }

    /// Record the opponent's move.
    pub fn apply_move(&mut self, mv: &Move) -> Result<(), EngineError> {
        self.game.push(mv)?;
        Ok(())
    }

    /// Start over from `game`, playing `engine_color`.
    pub fn reset(&mut self, game: Game, engine_color: Color) {
        self.game = game;
        self.engine_color = engine_color;
        self.record = None;
    }

    /// Shut down the oracle. Later moves fail with a terminated oracle.
    pub fn close(&mut self) {
        self.oracle.quit();
    }

    /// Take back the last move pair and rewind the active tactic to match.
    /// The tactic is dropped once the game is taken back before its first
    /// move. Returns the number of plies taken back.
    pub fn undo_tactic_move(&mut self) -> usize {
        let mut undone = 0;
        while undone < 2 && self.game.pop().is_some() {
            undone += 1;
        }
        let ply = self.game.ply();
        if let Some(record) = &mut self.record {
            if ply < record.start_ply() || !record.rewind() {
                debug!(ply, start = record.start_ply(), "tactic rewound past its start, dropping it");
                self.record = None;
            }
        }
        undone
    }

    /// Choose a move for the engine, play it on the engine's game and return it.
    pub fn play_move(&mut self) -> Result<Move, EngineError> {
        if self.game.is_game_over() {
            return Err(EngineError::GameOver {
                position: self.game.to_string(),
            });
        }
        if self.game.turn() != self.engine_color {
            return Err(EngineError::NotEngineTurn {
                position: self.game.to_string(),
            });
        }
        self.check_deviation();

        let lines = self.config.num_pv.max(2);
        let analysis = self.oracle.analyse(&self.game, &self.config.limit(), lines)?;
        let Some(best) = analysis.first() else {
            return Err(EngineError::NoAnalysis {
                position: self.game.to_string(),
            });
        };
        let best_score = self.engine_score(best.score);

        if best_score >= self.config.mate_threshold {
            let mv = self.first_move(best)?;
            debug!(mv = %uci_text(&mv), score = best_score, "playing forced mate");
            return self.play_shortcut(mv);
        }

        let only_move = match analysis.get(1) {
            None => true,
            Some(second) => best_score >= self.engine_score(second.score) + self.config.obvious_margin,
        };
        if only_move {
            let mv = self.first_move(best)?;
            debug!(mv = %uci_text(&mv), score = best_score, "playing only move");
            return self.play_shortcut(mv);
        }

        if let Some(record) = &mut self.record {
            if let Some(mv) = record.next_move() {
                if !self.game.is_legal(&mv) {
                    return Err(EngineError::IllegalMove {
                        uci: uci_text(&mv),
                        position: self.game.to_string(),
                    });
                }
                self.game.push(&mv)?;
                self.drop_if_complete();
                return Ok(mv);
            }
            self.record = None;
        }

        let mut search = TacticSearch::new(&mut self.oracle, &self.config, self.tactics, self.engine_color);
        let found = search.run(&self.game)?;
        let stats = search.stats();
        debug!(queries = stats.queries, nodes = stats.nodes, "tactic search finished");

        if let Some(mut record) = found {
            if let Some(mv) = record.next_move() {
                info!(%record, "starting tactic");
                self.game.push(&mv)?;
                self.record = Some(record);
                self.drop_if_complete();
                return Ok(mv);
            }
        }

        let mv = self.first_move(self.fallback(&analysis))?;
        debug!(mv = %uci_text(&mv), "no tactic, playing fallback move");
        self.game.push(&mv)?;
        Ok(mv)
    }

    /// Drop the active tactic if the opponent did not play the expected reply,
    /// or if the game no longer lines up with the tactic's cursor.
    fn check_deviation(&mut self) {
        let played = self.game.last_move().cloned();
        let ply = self.game.ply();
        let Some(record) = &mut self.record else {
            return;
        };
        let pending = ply.checked_sub(record.start_ply() + record.index());
        if pending == Some(0) {
            return;
        }
        if pending == Some(1) && played.is_some() && record.peek() == played.as_ref() {
            record.advance();
            self.drop_if_complete();
        } else {
            info!(
                expected = ?record.peek().map(uci_text),
                played = ?played.as_ref().map(uci_text),
                "opponent left the tactic"
            );
            self.record = None;
        }
    }

    /// Play a move chosen without the tactic, keeping the tactic only if it
    /// expected the same move.
    fn play_shortcut(&mut self, mv: Move) -> Result<Move, EngineError> {
        if let Some(record) = &mut self.record {
            if record.peek() == Some(&mv) {
                record.advance();
                self.drop_if_complete();
            } else {
                debug!("shortcut move leaves the tactic");
                self.record = None;
            }
        }
        self.game.push(&mv)?;
        Ok(mv)
    }

    fn drop_if_complete(&mut self) {
        if self.record.as_ref().is_some_and(TacticRecord::is_complete) {
            if let Some(record) = self.record.take() {
                info!(kind = %record.kind(), "tactic completed");
            }
        }
    }

    /// The weakest line that still keeps the engine level: the last of the
    /// leading lines with a non-negative score, or the best line if none.
    fn fallback<'a>(&self, analysis: &'a [AnalysisLine]) -> &'a AnalysisLine {
        let mut choice = &analysis[0];
        for line in analysis {
            if self.engine_score(line.score) < 0 {
                break;
            }
            choice = line;
        }
        choice
    }

    fn first_move(&self, line: &AnalysisLine) -> Result<Move, EngineError> {
        line.first().cloned().ok_or_else(|| EngineError::NoAnalysis {
            position: self.game.to_string(),
        })
    }

    fn engine_score(&self, score: Score) -> i32 {
        score.from_perspective(self.game.turn(), self.engine_color, self.config.mate_score)
    }
}
