//! Position-differential tactic detectors.
//!
//! Every detector looks at a game right after a move: the side to move is the
//! victim, the side that just moved is the creator. A detector only credits a
//! pattern that the last move created, and only when the victim cannot simply
//! refute it. Detectors return the squares of the pieces caught in the pattern,
//! or an empty bitboard.

mod fork;
mod pin;
mod skewer;

pub use fork::fork;
pub use pin::{absolute_pin, relative_pin};
pub use skewer::skewer;

use shakmaty::attacks::{between, bishop_attacks, rook_attacks};
use shakmaty::{Bitboard, Board, Color, Move, Role, Square};
use tactician_core::{Game, TacticKind, TacticSet, piece_value, value_on};

/// Detectors in the order they are tried.
const DETECTION_ORDER: [TacticKind; 4] = [
    TacticKind::Fork,
    TacticKind::RelativePin,
    TacticKind::AbsolutePin,
    TacticKind::Skewer,
];

/// Run the enabled detectors and return the first that fires.
pub fn detect(game: &Game, reply: Option<&Move>, enabled: TacticSet) -> Option<(TacticKind, Bitboard)> {
    DETECTION_ORDER
        .into_iter()
        .filter(|&kind| enabled.contains(kind))
        .find_map(|kind| {
            let squares = run(kind, game, reply);
            (!squares.is_empty()).then_some((kind, squares))
        })
}

/// Run a single detector. Checkmate has no positional detector.
pub fn run(kind: TacticKind, game: &Game, reply: Option<&Move>) -> Bitboard {
    match kind {
        TacticKind::Checkmate => Bitboard::EMPTY,
        TacticKind::Fork => fork(game, reply),
        TacticKind::AbsolutePin => absolute_pin(game, reply),
        TacticKind::RelativePin => relative_pin(game, reply),
        TacticKind::Skewer => skewer(game, reply),
    }
}

/// Pieces of `color` attacking `square`.
#[inline]
pub(crate) fn attackers(board: &Board, square: Square, color: Color) -> Bitboard {
    board.attacks_to(square, color, board.occupied())
}

/// Return the enemy slider that holds `pinned` on a line with `anchor`.
///
/// The line must run from `anchor` through `pinned` (and nothing else) to a
/// rook, bishop or queen of `attacker` moving along that line.
pub(crate) fn pinner_on_line(
    board: &Board,
    anchor: Square,
    pinned: Square,
    attacker: Color,
) -> Option<Square> {
    let queens = board.by_role(Role::Queen);
    let lines = [
        (rook_attacks(anchor, Bitboard::EMPTY), board.by_role(Role::Rook) | queens),
        (bishop_attacks(anchor, Bitboard::EMPTY), board.by_role(Role::Bishop) | queens),
    ];
    let pinned_bb = Bitboard::from(pinned);
    for (rays, sliders) in lines {
        if !rays.contains(pinned) {
            continue;
        }
        for sniper in rays & sliders & board.by_color(attacker) {
            let gap = between(anchor, sniper);
            if gap.contains(pinned) && gap & board.occupied() == pinned_bb {
                return Some(sniper);
            }
        }
    }
    None
}

/// Return `true` if the victim can capture the piece on `key` and come out
/// ahead: the capturer is worth less, or `key` is undefended.
pub(crate) fn refuted(game: &Game, key: Square) -> bool {
    let board = game.board();
    let creator = !game.turn();
    let key_value = value_on(board, key);
    let undefended = attackers(board, key, creator).is_empty();
    game.legal_moves()
        .iter()
        .filter(|mv| mv.to() == key && mv.is_capture())
        .any(|mv| undefended || piece_value(mv.role()) < key_value)
}

/// Return `true` if `capturer` can take the piece on `target` at a profit:
/// it has more attackers than defenders, or a cheaper piece attacks it.
pub(crate) fn capturable_at_profit(board: &Board, target: Square, capturer: Color) -> bool {
    let hits = attackers(board, target, capturer);
    if hits.is_empty() {
        return false;
    }
    let defenders = attackers(board, target, !capturer);
    let target_value = value_on(board, target);
    hits.count() > defenders.count() || hits.into_iter().any(|sq| value_on(board, sq) < target_value)
}

/// Where a victim piece ends up after `reply`.
#[inline]
pub(crate) fn relocated(square: Square, reply: &Move) -> Square {
    if reply.from() == Some(square) {
        reply.to()
    } else {
        square
    }
}
