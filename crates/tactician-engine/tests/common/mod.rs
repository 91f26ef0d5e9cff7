//! A scripted oracle for exercising the engine without a UCI process.

#![allow(dead_code)]

use std::collections::HashMap;

use tactician_core::{AnalysisLine, Game, Limit, Move, Oracle, OracleError, OracleOptions, Score};

/// Answers analysis requests from a script keyed by the moves played since
/// the root, in UCI notation separated by spaces (`""` for the root).
///
/// Positions without a script get every legal move as an equal `cp 0` line.
#[derive(Default)]
pub struct ScriptedOracle {
    scripts: HashMap<String, Vec<(String, Score)>>,
    /// Analysis requests received, as (position key, lines requested).
    pub requests: Vec<(String, usize)>,
    terminated: bool,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the lines returned after `key`. Each line is a UCI move list.
    pub fn script(mut self, key: &str, lines: &[(&str, Score)]) -> Self {
        let lines = lines.iter().map(|(pv, score)| (pv.to_string(), *score)).collect();
        self.scripts.insert(key.to_string(), lines);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.len()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

fn key(game: &Game) -> String {
    game.uci_moves().join(" ")
}

impl Oracle for ScriptedOracle {
    fn configure(&mut self, _options: &OracleOptions) -> Result<(), OracleError> {
        if self.terminated {
            return Err(OracleError::Terminated);
        }
        Ok(())
    }

    fn analyse(&mut self, game: &Game, _limit: &Limit, lines: usize) -> Result<Vec<AnalysisLine>, OracleError> {
        if self.terminated {
            return Err(OracleError::Terminated);
        }
        let key = key(game);
        self.requests.push((key.clone(), lines));

        let analysis: Vec<AnalysisLine> = match self.scripts.get(&key) {
            Some(script) => script
                .iter()
                .map(|(pv, score)| AnalysisLine {
                    pv: game.parse_uci_line(pv.split_whitespace()),
                    score: *score,
                })
                .filter(|line| !line.pv.is_empty())
                .take(lines)
                .collect(),
            None => game
                .legal_moves()
                .into_iter()
                .take(lines)
                .map(|mv| AnalysisLine {
                    pv: vec![mv],
                    score: Score::Cp(0),
                })
                .collect(),
        };
        Ok(analysis)
    }

    fn play(&mut self, game: &Game, limit: &Limit) -> Result<Move, OracleError> {
        let analysis = self.analyse(game, limit, 1)?;
        analysis
            .into_iter()
            .next()
            .and_then(|line| line.pv.into_iter().next())
            .ok_or_else(|| OracleError::NoBestMove {
                position: game.to_string(),
            })
    }

    fn quit(&mut self) {
        self.terminated = true;
    }
}
