//! Breadth-first search for a forcing line that ends in a tactic.
//!
//! The search alternates between the engine's moves, where every candidate
//! close enough to the best is explored, and the opponent's replies, where
//! only a single dominant reply keeps the line alive. Whenever the opponent
//! is forced, the oracle's principal variation is scanned with the detectors.

use std::collections::VecDeque;

use shakmaty::{Color, Move};
use tactician_core::{AnalysisLine, Game, Oracle, Score, TacticKind, TacticSet, uci_line};
use tracing::{debug, info};

use crate::config::DifficultyConfig;
use crate::detect::detect;
use crate::error::EngineError;
use crate::record::TacticRecord;

/// Counters from one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Oracle queries issued.
    pub queries: usize,
    /// Nodes taken off the queue.
    pub nodes: usize,
}

/// A position waiting to be expanded.
struct SearchNode {
    game: Game,
    depth: usize,
    sequence: Vec<Move>,
}

/// Searches for a tactic the engine can steer into.
pub struct TacticSearch<'a, O: Oracle + ?Sized> {
    oracle: &'a mut O,
    config: &'a DifficultyConfig,
    tactics: TacticSet,
    engine: Color,
    stats: SearchStats,
}

impl<'a, O: Oracle + ?Sized> TacticSearch<'a, O> {
    pub fn new(oracle: &'a mut O, config: &'a DifficultyConfig, tactics: TacticSet, engine: Color) -> Self {
        Self {
            oracle,
            config,
            tactics,
            engine,
            stats: SearchStats::default(),
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Search from `root` and return the first tactic found, if any.
    ///
    /// The returned record's moves start from `root`, at `root`'s ply.
    pub fn run(&mut self, root: &Game) -> Result<Option<TacticRecord>, EngineError> {
        let mut queue = VecDeque::new();
        queue.push_back(SearchNode {
            game: root.clone(),
            depth: 0,
            sequence: Vec::new(),
        });

        while let Some(node) = queue.pop_front() {
            if node.depth >= self.config.search_depth || node.game.is_game_over() {
                continue;
            }
            if self.stats.queries >= self.config.query_budget {
                debug!(queries = self.stats.queries, "query budget exhausted");
                break;
            }
            self.stats.nodes += 1;

            let engine_turn = node.game.turn() == self.engine;
            let legal = node.game.legal_moves().len();
            let lines = if !engine_turn {
                legal.min(2)
            } else if node.depth <= self.config.mistake_window {
                legal
            } else {
                self.config.num_pv
            };

            let analysis = self.analyse(&node.game, lines.max(1))?;
            let Some(best) = analysis.first() else {
                continue;
            };
            let best_score = self.engine_score(&node.game, best.score);
            debug!(
                depth = node.depth,
                line = %uci_line(&node.sequence),
                lines = analysis.len(),
                best = best_score,
                "expanding node"
            );

            if self.tactics.contains(TacticKind::Checkmate) && best_score >= self.config.mate_threshold {
                let mut moves = node.sequence.clone();
                moves.extend(best.pv.iter().cloned());
                let record = TacticRecord::new(moves, TacticKind::Checkmate, best_score).starting_at(root.ply());
                info!(%record, "forced mate found");
                return Ok(Some(record));
            }

            if engine_turn {
                self.expand_engine(&node, &analysis, best_score, &mut queue)?;
            } else if let Some(record) = self.expand_opponent(&node, &analysis, &mut queue)? {
                info!(%record, queries = self.stats.queries, "tactic found");
                return Ok(Some(record.starting_at(root.ply())));
            }
        }

        debug!(
            queries = self.stats.queries,
            nodes = self.stats.nodes,
            "no tactic found"
        );
        Ok(None)
    }

    /// Queue every engine move that scores close enough to the best.
    fn expand_engine(
        &self,
        node: &SearchNode,
        analysis: &[AnalysisLine],
        best_score: i32,
        queue: &mut VecDeque<SearchNode>,
    ) -> Result<(), EngineError> {
        let tolerance = if node.depth <= self.config.mistake_window {
            self.config.mistake_tolerance
        } else {
            self.config.continuation_tolerance
        };
        for line in analysis {
            if self.engine_score(&node.game, line.score) < best_score - tolerance {
                continue;
            }
            let Some(mv) = line.first() else {
                continue;
            };
            queue.push_back(self.successor(node, mv)?);
        }
        Ok(())
    }

    /// Follow a forced opponent reply and scan its line for tactics.
    fn expand_opponent(
        &self,
        node: &SearchNode,
        analysis: &[AnalysisLine],
        queue: &mut VecDeque<SearchNode>,
    ) -> Result<Option<TacticRecord>, EngineError> {
        let best = &analysis[0];
        let score = self.engine_score(&node.game, best.score);
        if let Some(second) = analysis.get(1) {
            let margin = self.engine_score(&node.game, second.score) - score;
            if margin < self.config.forcing_margin {
                return Ok(None);
            }
        }
        let Some(reply) = best.first() else {
            return Ok(None);
        };

        if score >= self.config.advantage_threshold {
            if !node.sequence.is_empty() {
                if let Some(kind) = self.detect(&node.game, Some(reply)) {
                    return Ok(Some(TacticRecord::new(node.sequence.clone(), kind, score)));
                }
            }

            let mut line = node.game.clone();
            for (j, mv) in best.pv.iter().enumerate() {
                if line.push(mv).is_err() {
                    break;
                }
                if line.turn() == self.engine {
                    continue;
                }
                if let Some(kind) = self.detect(&line, best.pv.get(j + 1)) {
                    let mut moves = node.sequence.clone();
                    moves.extend(best.pv[..=j].iter().cloned());
                    return Ok(Some(TacticRecord::new(moves, kind, score)));
                }
            }
        }

        queue.push_back(self.successor(node, reply)?);
        Ok(None)
    }

    fn detect(&self, game: &Game, reply: Option<&Move>) -> Option<TacticKind> {
        detect(game, reply, self.tactics).map(|(kind, _)| kind)
    }

    fn successor(&self, node: &SearchNode, mv: &Move) -> Result<SearchNode, EngineError> {
        let mut sequence = node.sequence.clone();
        sequence.push(mv.clone());
        Ok(SearchNode {
            game: node.game.child(mv)?,
            depth: node.depth + 1,
            sequence,
        })
    }

    fn analyse(&mut self, game: &Game, lines: usize) -> Result<Vec<AnalysisLine>, EngineError> {
        self.stats.queries += 1;
        let analysis = self.oracle.analyse(game, &self.config.limit(), lines)?;
        Ok(analysis)
    }

    fn engine_score(&self, game: &Game, score: Score) -> i32 {
        score.from_perspective(game.turn(), self.engine, self.config.mate_score)
    }
}
