//! Fork detection: one piece attacking two or more valuable targets.

use shakmaty::{Bitboard, Board, Color, Move, Role, Square};
use tactician_core::{Game, piece_value};

use super::{attackers, capturable_at_profit, relocated};

/// Return the targets forked by the piece that just moved.
///
/// The forking piece must stand on a square the victim does not attack and
/// hit at least two victim pieces. A target counts when it is the king, is
/// worth more than the forker, or is undefended. A check that hits only one
/// other, non-qualifying piece still counts if no reply can save everything:
/// no reply may take the forker, and after every reply some attacked piece
/// must still fall at a profit. A supplied `reply` is played out the same way.
pub fn fork(game: &Game, reply: Option<&Move>) -> Bitboard {
    let Some(last) = game.last_move() else {
        return Bitboard::EMPTY;
    };
    let board = game.board();
    let victim = game.turn();
    let creator = !victim;
    let forker = last.to();

    let Some(piece) = board.piece_at(forker) else {
        return Bitboard::EMPTY;
    };
    if piece.color != creator || attackers(board, forker, victim).any() {
        return Bitboard::EMPTY;
    }

    let attacked = board.attacks_from(forker) & board.by_color(victim);
    if attacked.count() < 2 {
        return Bitboard::EMPTY;
    }

    let forker_value = piece_value(piece.role);
    let mut targets = Bitboard::EMPTY;
    for square in attacked {
        let Some(role) = board.role_at(square) else {
            continue;
        };
        if role == Role::King
            || piece_value(role) > forker_value
            || attackers(board, square, victim).is_empty()
        {
            targets |= Bitboard::from(square);
        }
    }

    let king_hit = board.king_of(victim).is_some_and(|king| attacked.contains(king));
    if targets.count() < 2 {
        if !king_hit || !survives_every_reply(game, forker, attacked) {
            return Bitboard::EMPTY;
        }
        targets = attacked;
    }

    match reply {
        None => targets,
        Some(reply) => match game.child(reply) {
            Ok(after) if wins_material(after.board(), forker, attacked, reply, creator) => targets,
            _ => Bitboard::EMPTY,
        },
    }
}

/// Every legal reply leaves the forker alive and some attacked piece en prise.
fn survives_every_reply(game: &Game, forker: Square, attacked: Bitboard) -> bool {
    let creator = !game.turn();
    for reply in game.legal_moves() {
        if reply.to() == forker {
            return false;
        }
        let Ok(after) = game.child(&reply) else {
            return false;
        };
        if !wins_material(after.board(), forker, attacked, &reply, creator) {
            return false;
        }
    }
    true
}

/// The forker still attacks one of its original non-king targets, following it
/// if it moved, and can take it at a profit.
fn wins_material(board: &Board, forker: Square, attacked: Bitboard, reply: &Move, creator: Color) -> bool {
    if board.color_at(forker) != Some(creator) {
        return false;
    }
    let reach = board.attacks_from(forker);
    attacked
        .into_iter()
        .map(|square| relocated(square, reply))
        .filter(|&square| board.role_at(square).is_some_and(|role| role != Role::King))
        .any(|square| reach.contains(square) && capturable_at_profit(board, square, creator))
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
    fn knight_forks_king_and_rook() {
        let game = after("2r3k1/8/8/3N4/8/8/8/4K3 w - - 0 1", "d5e7");
        let expected = Bitboard::from(Square::C8) | Bitboard::from(Square::G8);
        assert_eq!(fork(&game, None), expected);
    }

    #[test]
    fn fork_is_idempotent() {
        let game = after("2r3k1/8/8/3N4/8/8/8/4K3 w - - 0 1", "d5e7");
        assert_eq!(fork(&game, None), fork(&game, None));
    }

    #[test]
    fn fork_holds_after_king_steps_away() {
        let game = after("2r3k1/8/8/3N4/8/8/8/4K3 w - - 0 1", "d5e7");
        let reply = game.parse_uci("g8h8").unwrap();
        assert!(!fork(&game, Some(&reply)).is_empty());
    }

    #[test]
    fn attacked_forker_is_no_fork() {
        // The rook on e8 covers e7.
        let game = after("2r1r1k1/8/8/3N4/8/8/8/3K4 w - - 0 1", "d5e7");
        assert!(fork(&game, None).is_empty());
    }

    #[test]
    fn check_against_defended_equal_piece_is_no_fork() {
        // Nc7+ also hits the bishop on b5, but the pawn on c6 guards it.
        let game = after("4k3/8/2p1N3/1b6/8/8/8/4K3 w - - 0 1", "e6c7");
        assert!(fork(&game, None).is_empty());
    }

    #[test]
    fn single_target_is_no_fork() {
        let game = after("2r5/6k1/8/3N4/8/8/8/4K3 w - - 0 1", "d5e7");
        assert!(fork(&game, None).is_empty());
    }

    #[test]
    fn no_history_is_no_fork() {
        let game = Game::from_fen("2r3k1/4N3/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(fork(&game, None).is_empty());
    }
}
