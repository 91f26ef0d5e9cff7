//! A UCI engine child process driven as an [`Oracle`].

use std::cmp::Reverse;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tactician_core::{AnalysisLine, Game, Limit, MATE_SCORE, Move, Oracle, OracleError, OracleOptions};
use tracing::{debug, info, warn};

use crate::error::UciError;
use crate::message::{EngineMessage, InfoLine, parse_message};

/// Depth used when a [`Limit`] sets neither depth nor time.
const DEFAULT_DEPTH: u8 = 12;

/// A running UCI engine.
///
/// The process is told to quit when the oracle is shut down or dropped.
pub struct UciOracle {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    name: Option<String>,
    /// MultiPV value last sent to the engine.
    multipv: usize,
    terminated: bool,
}

impl UciOracle {
    /// Start `program` and complete the UCI handshake.
    pub fn spawn(program: impl AsRef<OsStr>) -> Result<Self, UciError> {
        Self::from_command(Command::new(program))
    }

    /// Start a prepared command and complete the UCI handshake.
    pub fn from_command(mut command: Command) -> Result<Self, UciError> {
        let program = command.get_program().to_string_lossy().into_owned();
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| UciError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(UciError::MissingPipe { stream: "stdin" })?;
        let stdout = child.stdout.take().ok_or(UciError::MissingPipe { stream: "stdout" })?;

        let mut oracle = Self {
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            name: None,
            multipv: 1,
            terminated: false,
        };

        oracle.send("uci")?;
        loop {
            match oracle.read_message()? {
                EngineMessage::UciOk => break,
                EngineMessage::Id { field, value } if field == "name" => oracle.name = Some(value),
                _ => {}
            }
        }
        oracle.sync()?;
        info!(program = %program, name = ?oracle.name, "engine ready");
        Ok(oracle)
    }

    /// The name the engine reported in its handshake.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn send(&mut self, command: &str) -> Result<(), UciError> {
        debug!(command, "to engine");
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Read the next line the engine prints. Unparseable lines are logged and
    /// skipped.
    fn read_message(&mut self) -> Result<EngineMessage, UciError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(UciError::Closed);
            }
            match parse_message(&line) {
                Ok(message) => return Ok(message),
                Err(err) => warn!(line = line.trim(), error = %err, "skipping engine output"),
            }
        }
    }

    /// Send `isready` and wait for `readyok`.
    fn sync(&mut self) -> Result<(), UciError> {
        self.send("isready")?;
        while self.read_message()? != EngineMessage::ReadyOk {}
        Ok(())
    }

    fn set_option(&mut self, name: &str, value: impl std::fmt::Display) -> Result<(), UciError> {
        self.send(&format!("setoption name {name} value {value}"))
    }

    fn set_multipv(&mut self, lines: usize) -> Result<(), UciError> {
        let lines = lines.max(1);
        if lines != self.multipv {
            self.set_option("MultiPV", lines)?;
            self.multipv = lines;
        }
        Ok(())
    }

    fn set_position(&mut self, game: &Game) -> Result<(), UciError> {
        let moves = game.uci_moves();
        let command = if moves.is_empty() {
            format!("position fen {}", game.root_fen())
        } else {
            format!("position fen {} moves {}", game.root_fen(), moves.join(" "))
        };
        self.send(&command)
    }

    fn go(&mut self, limit: &Limit) -> Result<(), UciError> {
        let mut command = String::from("go");
        if let Some(depth) = limit.depth {
            command.push_str(&format!(" depth {depth}"));
        }
        if let Some(time) = limit.time {
            command.push_str(&format!(" movetime {}", time.as_millis()));
        }
        if limit.depth.is_none() && limit.time.is_none() {
            command.push_str(&format!(" depth {DEFAULT_DEPTH}"));
        }
        self.send(&command)
    }

    /// Run a search and collect the latest complete line per PV index until
    /// `bestmove` arrives.
    fn search(&mut self, game: &Game, limit: &Limit) -> Result<(Vec<InfoLine>, Option<String>), UciError> {
        self.set_position(game)?;
        self.go(limit)?;

        let mut lines: Vec<Option<InfoLine>> = Vec::new();
        loop {
            match self.read_message()? {
                EngineMessage::Info(info) if info.is_complete() => {
                    let slot = info.multipv.saturating_sub(1);
                    if slot >= lines.len() {
                        lines.resize(slot + 1, None);
                    }
                    lines[slot] = Some(info);
                }
                EngineMessage::BestMove { best, .. } => {
                    return Ok((rank_lines(lines.into_iter().flatten().collect()), best));
                }
                _ => {}
            }
        }
    }

    fn ensure_running(&self) -> Result<(), OracleError> {
        if self.terminated {
            return Err(OracleError::Terminated);
        }
        Ok(())
    }
}

/// Order lines best first for the side to move.
///
/// A search stopped mid-iteration can leave PV slots from different depths,
/// so the engine's own MultiPV numbering is not trusted.
fn rank_lines(mut lines: Vec<InfoLine>) -> Vec<InfoLine> {
    lines.sort_by_key(|info| Reverse(info.score.map_or(i32::MIN, |score| score.to_centipawns(MATE_SCORE))));
    lines
}

impl Oracle for UciOracle {
    fn configure(&mut self, options: &OracleOptions) -> Result<(), OracleError> {
        self.ensure_running()?;
        self.set_option("Threads", options.threads)?;
        self.set_option("Hash", options.hash_mb)?;
        self.sync()?;
        Ok(())
    }

    fn analyse(&mut self, game: &Game, limit: &Limit, lines: usize) -> Result<Vec<AnalysisLine>, OracleError> {
        self.ensure_running()?;
        self.set_multipv(lines)?;
        let (infos, _) = self.search(game, limit)?;

        let analysis: Vec<AnalysisLine> = infos
            .into_iter()
            .filter_map(|info| {
                let pv = game.parse_uci_line(info.pv.iter().map(String::as_str));
                let score = info.score?;
                (!pv.is_empty()).then_some(AnalysisLine { pv, score })
            })
            .collect();
        debug!(position = %game, lines = analysis.len(), "analysis");

        if analysis.is_empty() {
            return Err(OracleError::NoAnalysis {
                position: game.to_string(),
            });
        }
        Ok(analysis)
    }

    fn play(&mut self, game: &Game, limit: &Limit) -> Result<Move, OracleError> {
        self.ensure_running()?;
        self.set_multipv(1)?;
        let (_, best) = self.search(game, limit)?;
        best.and_then(|text| game.parse_uci(&text).ok())
            .ok_or_else(|| OracleError::NoBestMove {
                position: game.to_string(),
            })
    }

    fn quit(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        if let Err(err) = self.send("quit") {
            debug!(error = %err, "engine already gone");
        }
        if let Err(err) = self.child.wait() {
            warn!(error = %err, "failed to reap engine process");
        }
    }
}

impl Drop for UciOracle {
    fn drop(&mut self) {
        self.quit();
    }
}
