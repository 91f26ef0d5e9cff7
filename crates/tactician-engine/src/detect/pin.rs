//! Absolute and relative pin detection.

use shakmaty::attacks::{bishop_attacks, rook_attacks};
use shakmaty::{Bitboard, Board, Color, Move, Position, Role, Square};
use tactician_core::{Game, value_on};

use super::{attackers, capturable_at_profit, pinner_on_line, refuted, relocated};

/// Return the victim pieces newly pinned to their own king.
///
/// Kings and pawns are never reported. A pin only counts if the pinning piece
/// cannot be taken at a profit and the pin is worth something to the creator.
pub fn absolute_pin(game: &Game, reply: Option<&Move>) -> Bitboard {
    let Some(previous) = game.previous() else {
        return Bitboard::EMPTY;
    };
    let board = game.board();
    let victim = game.turn();
    let creator = !victim;
    let Some(king) = board.king_of(victim) else {
        return Bitboard::EMPTY;
    };
    let previous_king = previous.board().king_of(victim);

    let candidates = board.by_color(victim) & !board.by_role(Role::King) & !board.by_role(Role::Pawn);
    let mut pinned = Bitboard::EMPTY;
    for square in candidates {
        let Some(pinner) = pinner_on_line(board, king, square, creator) else {
            continue;
        };
        let already = previous_king
            .is_some_and(|king| pinner_on_line(previous.board(), king, square, creator).is_some());
        if already || !sound(game, square, pinner) {
            continue;
        }
        if let Some(reply) = reply {
            if !holds_after(game, reply, Some(king), square, pinner) {
                continue;
            }
        }
        pinned |= Bitboard::from(square);
    }
    pinned
}

/// Return the victim pieces newly pinned to a more valuable piece behind them.
///
/// The anchor is any victim piece other than the king or a pawn. The pinned
/// piece must be worth no more than the anchor and the pinning piece strictly
/// less, so moving out of the line costs the victim material.
pub fn relative_pin(game: &Game, reply: Option<&Move>) -> Bitboard {
    let Some(previous) = game.previous() else {
        return Bitboard::EMPTY;
    };
    let board = game.board();
    let victim = game.turn();
    let creator = !victim;
    let own = board.by_color(victim);

    let anchors = own & !board.by_role(Role::King) & !board.by_role(Role::Pawn);
    let mut pinned = Bitboard::EMPTY;
    for anchor in anchors {
        let anchor_value = value_on(board, anchor);
        let lines = rook_attacks(anchor, Bitboard::EMPTY) | bishop_attacks(anchor, Bitboard::EMPTY);
        let candidates = lines & own & !board.by_role(Role::King);
        for square in candidates {
            if value_on(board, square) > anchor_value {
                continue;
            }
            let Some(pinner) = pinner_on_line(board, anchor, square, creator) else {
                continue;
            };
            if value_on(board, pinner) >= anchor_value {
                continue;
            }
            if pinner_on_line(previous.board(), anchor, square, creator).is_some() {
                continue;
            }
            if !sound(game, square, pinner) {
                continue;
            }
            if let Some(reply) = reply {
                if !holds_after(game, reply, Some(anchor), square, pinner) {
                    continue;
                }
            }
            pinned |= Bitboard::from(square);
        }
    }
    pinned
}

/// The pin survives refutation and is exploitable.
fn sound(game: &Game, pinned: Square, pinner: Square) -> bool {
    !refuted(game, pinner) && exploitable(game, pinned, pinner)
}

/// The creator gains from the pin: the pinned piece is frozen, the pinner is
/// safe, the pinned piece is outnumbered, or it is the only guard of another
/// attacked piece.
fn exploitable(game: &Game, pinned: Square, pinner: Square) -> bool {
    let board = game.board();
    let victim = game.turn();
    let creator = !victim;

    let frozen = game.legal_moves().iter().all(|mv| mv.from() != Some(pinned));
    if frozen {
        return true;
    }
    if attackers(board, pinner, creator).is_empty() {
        return true;
    }
    if attackers(board, pinned, creator).count() > attackers(board, pinned, victim).count() {
        return true;
    }
    sole_guard(board, pinned, victim)
}

/// `guard` is the only defender of some other victim piece the creator attacks.
fn sole_guard(board: &Board, guard: Square, victim: Color) -> bool {
    let guard_bb = Bitboard::from(guard);
    let others = board.by_color(victim) & !board.by_role(Role::King) & !guard_bb;
    others.into_iter().any(|square| {
        attackers(board, square, !victim).any() && attackers(board, square, victim) == guard_bb
    })
}

/// After `reply`, the pinned piece is still stuck on the line or can be won.
fn holds_after(game: &Game, reply: &Move, anchor: Option<Square>, pinned: Square, pinner: Square) -> bool {
    let Ok(after) = game.child(reply) else {
        return false;
    };
    let creator = !game.turn();
    let board = after.board();
    if board.color_at(pinner) != Some(creator) {
        return false;
    }
    let pinned_now = relocated(pinned, reply);
    if board.color_at(pinned_now) != Some(game.turn()) {
        return false;
    }
    let still_pinned = anchor
        .map(|anchor| relocated(anchor, reply))
        .is_some_and(|anchor| pinner_on_line(board, anchor, pinned_now, creator) == Some(pinner));
    still_pinned || capturable_at_profit(board, pinned_now, creator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn after(fen: &str, mv: &str) -> Game {
        let mut game = Game::from_fen(fen).unwrap();
        game.push_uci(mv).unwrap();
        game
    }

    #[test]
    fn bishop_pins_knight_to_king() {
        let game = after("4k3/8/2n5/8/8/8/8/4KB2 w - - 0 1", "f1b5");
        assert_eq!(absolute_pin(&game, None), Bitboard::from(Square::C6));
    }

    #[test]
    fn existing_pin_is_not_reflagged() {
        let game = after("4k3/8/2n5/1B6/8/8/8/4K3 w - - 0 1", "e1d2");
        assert!(absolute_pin(&game, None).is_empty());
    }

    #[test]
    fn pin_refuted_by_pawn_capture() {
        let game = after("4k3/8/p1n5/8/8/8/8/4KB2 w - - 0 1", "f1b5");
        assert!(absolute_pin(&game, None).is_empty());
    }

    #[test]
    fn pinned_pawn_is_ignored() {
        let game = after("4k3/3p4/8/8/8/8/8/4KB2 w - - 0 1", "f1b5");
        assert!(absolute_pin(&game, None).is_empty());
    }

    #[test]
    fn bishop_pins_knight_to_queen() {
        let game = after("1k5q/8/5n2/8/8/4B3/8/6K1 w - - 0 1", "e3d4");
        assert_eq!(relative_pin(&game, None), Bitboard::from(Square::F6));
        assert!(absolute_pin(&game, None).is_empty());
    }

    #[test]
    fn queen_cannot_pin_to_queen() {
        // The pinner must be worth less than the anchor.
        let game = after("1k5q/8/5n2/8/8/4Q3/8/6K1 w - - 0 1", "e3d4");
        assert!(relative_pin(&game, None).is_empty());
    }

    #[test]
    fn relative_pin_survives_quiet_reply() {
        let game = after("1k5q/8/5n2/8/8/4B3/8/6K1 w - - 0 1", "e3d4");
        let reply = game.parse_uci("b8a8").unwrap();
        assert!(!relative_pin(&game, Some(&reply)).is_empty());
    }
}
