//! Parsing of UCI engine output.

use tactician_core::Score;

use crate::error::UciError;

/// Whether a reported score is exact or only a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

/// The fields of an `info` line that the oracle uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    /// Search depth in plies.
    pub depth: Option<u32>,
    /// 1-based index of the principal variation.
    pub multipv: usize,
    /// Score relative to the side to move.
    pub score: Option<Score>,
    /// Set when the score is a lower or upper bound.
    pub bound: Option<Bound>,
    /// Nodes searched.
    pub nodes: Option<u64>,
    /// Principal variation in UCI notation.
    pub pv: Vec<String>,
    /// Free text following `string`.
    pub text: Option<String>,
}

impl Default for InfoLine {
    fn default() -> Self {
        Self {
            depth: None,
            multipv: 1,
            score: None,
            bound: None,
            nodes: None,
            pv: Vec::new(),
            text: None,
        }
    }
}

impl InfoLine {
    /// An exact score with a principal variation.
    pub fn is_complete(&self) -> bool {
        self.score.is_some() && self.bound.is_none() && !self.pv.is_empty()
    }
}

/// A parsed line of engine output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    /// `id name ...` or `id author ...`.
    Id { field: String, value: String },
    /// `uciok` -- handshake finished.
    UciOk,
    /// `readyok` -- reply to `isready`.
    ReadyOk,
    /// `info ...` -- search progress.
    Info(InfoLine),
    /// `bestmove <move> [ponder <move>]`; `best` is `None` for `(none)`.
    BestMove {
        best: Option<String>,
        ponder: Option<String>,
    },
    /// Anything else (option declarations, banners, blank lines).
    Unknown(String),
}

/// Parse a single line of engine output.
pub fn parse_message(line: &str) -> Result<EngineMessage, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(EngineMessage::Unknown(String::new()));
    }

    match tokens[0] {
        "uciok" => Ok(EngineMessage::UciOk),
        "readyok" => Ok(EngineMessage::ReadyOk),
        "id" => parse_id(&tokens[1..]),
        "info" => parse_info(&tokens[1..]).map(EngineMessage::Info),
        "bestmove" => parse_bestmove(&tokens[1..]),
        _ => Ok(EngineMessage::Unknown(line.trim().to_string())),
    }
}

fn parse_id(tokens: &[&str]) -> Result<EngineMessage, UciError> {
    let field = tokens.first().ok_or_else(|| UciError::MissingValue {
        field: "id".to_string(),
    })?;
    Ok(EngineMessage::Id {
        field: field.to_string(),
        value: tokens[1..].join(" "),
    })
}

fn parse_bestmove(tokens: &[&str]) -> Result<EngineMessage, UciError> {
    let best = tokens.first().ok_or_else(|| UciError::MissingValue {
        field: "bestmove".to_string(),
    })?;
    let best = (*best != "(none)" && *best != "0000").then(|| best.to_string());
    let ponder = match tokens.get(1) {
        Some(&"ponder") => tokens.get(2).map(|mv| mv.to_string()),
        _ => None,
    };
    Ok(EngineMessage::BestMove { best, ponder })
}

/// Parse the body of an `info` line.
///
/// Keywords the oracle does not use are skipped along with their values.
fn parse_info(tokens: &[&str]) -> Result<InfoLine, UciError> {
    let mut info = InfoLine::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                info.depth = Some(parse_int(tokens.get(i + 1), "depth")?);
                i += 2;
            }
            "multipv" => {
                info.multipv = parse_int(tokens.get(i + 1), "multipv")?;
                i += 2;
            }
            "nodes" => {
                info.nodes = Some(parse_int(tokens.get(i + 1), "nodes")?);
                i += 2;
            }
            "score" => {
                info.score = Some(parse_score(tokens.get(i + 1), tokens.get(i + 2))?);
                i += 3;
            }
            "lowerbound" => {
                info.bound = Some(Bound::Lower);
                i += 1;
            }
            "upperbound" => {
                info.bound = Some(Bound::Upper);
                i += 1;
            }
            "seldepth" | "time" | "nps" | "hashfull" | "tbhits" | "cpuload" | "currmove"
            | "currmovenumber" | "refutation" => {
                i += 2;
            }
            "wdl" => {
                i += 4;
            }
            "pv" => {
                info.pv = tokens[i + 1..].iter().map(|mv| mv.to_string()).collect();
                break;
            }
            "string" => {
                info.text = Some(tokens[i + 1..].join(" "));
                break;
            }
            _ => {
                i += 1;
            }
        }
    }

    Ok(info)
}

fn parse_score(kind: Option<&&str>, value: Option<&&str>) -> Result<Score, UciError> {
    let kind = kind.ok_or_else(|| UciError::MissingValue {
        field: "score".to_string(),
    })?;
    match *kind {
        "cp" => Ok(Score::Cp(parse_int(value, "score cp")?)),
        "mate" => Ok(Score::Mate(parse_int(value, "score mate")?)),
        other => Err(UciError::InvalidValue {
            field: "score".to_string(),
            value: other.to_string(),
        }),
    }
}

/// Parse an integer value from a token.
fn parse_int<T: std::str::FromStr>(token: Option<&&str>, field: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingValue {
        field: field.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(line: &str) -> InfoLine {
        match parse_message(line).unwrap() {
            EngineMessage::Info(info) => info,
            other => panic!("expected info, got {other:?}"),
        }
    }

    // ── Handshake ─────────────────────────────────────────────────────────────

    #[test]
    fn parse_handshake() {
        assert_eq!(parse_message("uciok").unwrap(), EngineMessage::UciOk);
        assert_eq!(parse_message("readyok\n").unwrap(), EngineMessage::ReadyOk);
    }

    #[test]
    fn parse_id_name() {
        assert_eq!(
            parse_message("id name Stockfish 16.1").unwrap(),
            EngineMessage::Id {
                field: "name".to_string(),
                value: "Stockfish 16.1".to_string(),
            }
        );
    }

    #[test]
    fn option_lines_are_unknown() {
        let msg = parse_message("option name Hash type spin default 16 min 1 max 33554432").unwrap();
        assert!(matches!(msg, EngineMessage::Unknown(_)));
        assert_eq!(parse_message("   ").unwrap(), EngineMessage::Unknown(String::new()));
    }

    // ── Info ──────────────────────────────────────────────────────────────────

    #[test]
    fn parse_full_info_line() {
        let info = info(
            "info depth 20 seldepth 28 multipv 2 score cp -35 nodes 123456 nps 1000000 \
             hashfull 50 tbhits 0 time 120 pv e7e5 g1f3 b8c6",
        );
        assert_eq!(info.depth, Some(20));
        assert_eq!(info.multipv, 2);
        assert_eq!(info.score, Some(Score::Cp(-35)));
        assert_eq!(info.nodes, Some(123_456));
        assert_eq!(info.pv, vec!["e7e5", "g1f3", "b8c6"]);
        assert!(info.is_complete());
    }

    #[test]
    fn parse_mate_score() {
        let info = info("info depth 5 score mate -3 pv e8d8");
        assert_eq!(info.score, Some(Score::Mate(-3)));
        assert_eq!(info.multipv, 1);
    }

    #[test]
    fn bound_scores_are_incomplete() {
        let info = info("info depth 18 score cp 40 lowerbound nodes 1000 pv d2d4");
        assert_eq!(info.bound, Some(Bound::Lower));
        assert!(!info.is_complete());
    }

    #[test]
    fn wdl_and_currmove_are_skipped() {
        let info = info("info depth 9 currmove e2e4 currmovenumber 1 score cp 12 wdl 100 800 100 pv e2e4");
        assert_eq!(info.score, Some(Score::Cp(12)));
        assert_eq!(info.pv, vec!["e2e4"]);
    }

    #[test]
    fn info_string() {
        let info = info("info string NNUE evaluation using nn-abc.nnue enabled");
        assert_eq!(info.text.as_deref(), Some("NNUE evaluation using nn-abc.nnue enabled"));
        assert!(!info.is_complete());
    }

    #[test]
    fn invalid_depth_is_an_error() {
        let err = parse_message("info depth deep").unwrap_err();
        assert!(matches!(err, UciError::InvalidValue { .. }));
    }

    #[test]
    fn missing_score_value_is_an_error() {
        let err = parse_message("info score cp").unwrap_err();
        assert!(matches!(err, UciError::MissingValue { .. }));
    }

    // ── Bestmove ──────────────────────────────────────────────────────────────

    #[test]
    fn parse_bestmove_with_ponder() {
        assert_eq!(
            parse_message("bestmove e2e4 ponder e7e5").unwrap(),
            EngineMessage::BestMove {
                best: Some("e2e4".to_string()),
                ponder: Some("e7e5".to_string()),
            }
        );
    }

    #[test]
    fn parse_bestmove_none() {
        assert_eq!(
            parse_message("bestmove (none)").unwrap(),
            EngineMessage::BestMove {
                best: None,
                ponder: None,
            }
        );
    }
}
