//! Tactic classification and the set of enabled tactic kinds.

use std::fmt;
use std::str::FromStr;

use crate::error::PuzzleError;

/// A tactical motif the engine can steer toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TacticKind {
    Checkmate = 0,
    Fork = 1,
    AbsolutePin = 2,
    RelativePin = 3,
    Skewer = 4,
}

impl TacticKind {
    /// Total number of tactic kinds.
    pub const COUNT: usize = 5;

    /// All tactic kinds in ordinal order.
    pub const ALL: [TacticKind; 5] = [
        TacticKind::Checkmate,
        TacticKind::Fork,
        TacticKind::AbsolutePin,
        TacticKind::RelativePin,
        TacticKind::Skewer,
    ];

    const NAMES: [&'static str; 5] = ["Checkmate", "Fork", "Absolute Pin", "Relative Pin", "Skewer"];

    /// Return the stable ordinal (0..4).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Return the kind with the given ordinal.
    #[inline]
    pub const fn from_index(index: usize) -> Option<TacticKind> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Return the human-readable name.
    #[inline]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// Return the short lowercase token used on the command line.
    pub const fn token(self) -> &'static str {
        match self {
            TacticKind::Checkmate => "mate",
            TacticKind::Fork => "fork",
            TacticKind::AbsolutePin => "absolute-pin",
            TacticKind::RelativePin => "relative-pin",
            TacticKind::Skewer => "skewer",
        }
    }
}

impl fmt::Display for TacticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses an ordinal (`"2"`), a display name (`"Absolute Pin"`) or a
/// command-line token (`"absolute-pin"`), ignoring case.
impl FromStr for TacticKind {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return TacticKind::from_index(index).ok_or_else(|| PuzzleError::InvalidKind {
                found: s.to_string(),
            });
        }
        TacticKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s) || kind.token().eq_ignore_ascii_case(s))
            .ok_or_else(|| PuzzleError::InvalidKind {
                found: s.to_string(),
            })
    }
}

/// The enabled tactic kinds, one bit per [`TacticKind`] ordinal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TacticSet(u8);

impl TacticSet {
    /// No tactics enabled.
    pub const NONE: TacticSet = TacticSet(0);
    /// Every tactic enabled.
    pub const ALL: TacticSet = TacticSet(0b1_1111);

    /// The set containing only `kind`.
    #[inline]
    pub const fn only(kind: TacticKind) -> TacticSet {
        TacticSet(1 << kind as u8)
    }

    /// Return the raw bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Return `true` if no tactic is enabled.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Return `true` if `kind` is enabled.
    #[inline]
    pub const fn contains(self, kind: TacticKind) -> bool {
        self.0 & (1 << kind as u8) != 0
    }

    /// Return a new set with `kind` enabled.
    #[inline]
    pub const fn insert(self, kind: TacticKind) -> TacticSet {
        TacticSet(self.0 | (1 << kind as u8))
    }

    /// Return a new set with `kind` disabled.
    #[inline]
    pub const fn remove(self, kind: TacticKind) -> TacticSet {
        TacticSet(self.0 & !(1 << kind as u8))
    }

    /// Iterate the enabled kinds in ordinal order.
    pub fn iter(self) -> impl Iterator<Item = TacticKind> {
        TacticKind::ALL.into_iter().filter(move |&kind| self.contains(kind))
    }
}

impl Default for TacticSet {
    fn default() -> Self {
        TacticSet::ALL
    }
}

impl FromIterator<TacticKind> for TacticSet {
    fn from_iter<I: IntoIterator<Item = TacticKind>>(iter: I) -> Self {
        iter.into_iter().fold(TacticSet::NONE, TacticSet::insert)
    }
}

impl fmt::Debug for TacticSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for TacticSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let names: Vec<&str> = self.iter().map(TacticKind::token).collect();
        f.write_str(&names.join(","))
    }
}
