//! Oracle evaluations and their conversion to signed centipawns.

use std::fmt;

use shakmaty::Color;

/// Magnitude a forced mate saturates to when converted to centipawns.
pub const MATE_SCORE: i32 = 100_000;

/// An evaluation relative to the side to move, as a UCI engine reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Score {
    /// Centipawns.
    Cp(i32),
    /// Mate in `n` moves; negative when the side to move is getting mated.
    Mate(i32),
}

impl Score {
    /// Centipawns from the side to move's point of view, with mate in `n`
    /// mapped to `mate_score - n` and mated in `n` to `-mate_score - n`.
    #[inline]
    pub const fn to_centipawns(self, mate_score: i32) -> i32 {
        match self {
            Score::Cp(cp) => cp,
            Score::Mate(n) if n > 0 => mate_score - n,
            Score::Mate(n) => -mate_score - n,
        }
    }

    /// Centipawns from `perspective`'s point of view, given that the score was
    /// reported with `turn` to move.
    #[inline]
    pub fn from_perspective(self, turn: Color, perspective: Color, mate_score: i32) -> i32 {
        let cp = self.to_centipawns(mate_score);
        if turn == perspective { cp } else { -cp }
    }

    /// Return `true` if this is a mate score.
    #[inline]
    pub const fn is_mate(self) -> bool {
        matches!(self, Score::Mate(_))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Cp(cp) => write!(f, "cp {cp}"),
            Score::Mate(n) => write!(f, "mate {n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centipawns_pass_through() {
        assert_eq!(Score::Cp(35).to_centipawns(MATE_SCORE), 35);
        assert_eq!(Score::Cp(-120).to_centipawns(MATE_SCORE), -120);
    }

    #[test]
    fn mate_saturates() {
        assert_eq!(Score::Mate(3).to_centipawns(MATE_SCORE), 99_997);
        assert_eq!(Score::Mate(-2).to_centipawns(MATE_SCORE), -99_998);
        assert_eq!(Score::Mate(0).to_centipawns(MATE_SCORE), -100_000);
    }

    #[test]
    fn shorter_mate_is_better() {
        assert!(Score::Mate(1).to_centipawns(MATE_SCORE) > Score::Mate(4).to_centipawns(MATE_SCORE));
        assert!(Score::Mate(-1).to_centipawns(MATE_SCORE) < Score::Mate(-4).to_centipawns(MATE_SCORE));
    }

    #[test]
    fn perspective_flips_sign() {
        let score = Score::Cp(250);
        assert_eq!(score.from_perspective(Color::White, Color::White, MATE_SCORE), 250);
        assert_eq!(score.from_perspective(Color::Black, Color::White, MATE_SCORE), -250);
    }

    #[test]
    fn display() {
        assert_eq!(Score::Cp(-40).to_string(), "cp -40");
        assert_eq!(Score::Mate(2).to_string(), "mate 2");
        assert!(Score::Mate(2).is_mate());
        assert!(!Score::Cp(2).is_mate());
    }
}
