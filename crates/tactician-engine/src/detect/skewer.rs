//! Skewer detection: a valuable piece forced aside to expose one behind it.

use shakmaty::{Bitboard, Move, Position, Role, Square};
use tactician_core::{Game, value_on};

use super::{attackers, pinner_on_line, refuted, relocated};

/// Return the front pieces of newly created skewers.
///
/// The front piece sits between an enemy slider and a less valuable victim
/// piece. It must be forced to move (king, worth more than the skewering piece,
/// or guarded only by the piece behind it), and the back piece must then be
/// lost (undefended, or worth more than the skewering piece).
pub fn skewer(game: &Game, reply: Option<&Move>) -> Bitboard {
    let Some(previous) = game.previous() else {
        return Bitboard::EMPTY;
    };
    let board = game.board();
    let victim = game.turn();
    let creator = !victim;
    let own = board.by_color(victim);

    let mut fronts = Bitboard::EMPTY;
    for back in own & !board.by_role(Role::King) {
        let back_value = value_on(board, back);
        for front in own & !Bitboard::from(back) {
            let front_value = value_on(board, front);
            if front_value <= back_value {
                continue;
            }
            let Some(skewerer) = pinner_on_line(board, back, front, creator) else {
                continue;
            };
            let skewerer_value = value_on(board, skewerer);

            let front_forced = board.role_at(front) == Some(Role::King)
                || front_value > skewerer_value
                || (attackers(board, front, victim) & !Bitboard::from(back)).is_empty();
            let back_won = attackers(board, back, victim).is_empty() || back_value > skewerer_value;
            if !front_forced || !back_won {
                continue;
            }
            if pinner_on_line(previous.board(), back, front, creator).is_some() {
                continue;
            }
            if refuted(game, skewerer) {
                continue;
            }
            if let Some(reply) = reply {
                if !wins_back_piece(game, reply, back, skewerer) {
                    continue;
                }
            }
            fronts |= Bitboard::from(front);
        }
    }
    fronts
}

/// After `reply`, the skewering piece still hits the back piece and gains by
/// taking it.
fn wins_back_piece(game: &Game, reply: &Move, back: Square, skewerer: Square) -> bool {
    let Ok(after) = game.child(reply) else {
        return false;
    };
    let board = after.board();
    let victim = game.turn();
    if board.color_at(skewerer) != Some(!victim) {
        return false;
    }
    let back_now = relocated(back, reply);
    if board.color_at(back_now) != Some(victim) || !board.attacks_from(skewerer).contains(back_now) {
        return false;
    }
    value_on(board, back_now) > value_on(board, skewerer) || attackers(board, back_now, victim).is_empty()
}
