//! Material values used for the soundness checks in tactic detection.

use shakmaty::{Board, Role, Square};

/// Piece values indexed pawn, knight, bishop, rook, queen, king.
pub const PIECE_VALUES: [i32; 6] = [100, 300, 300, 500, 900, 20_000];

/// Return the value of a piece role.
#[inline]
pub const fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PIECE_VALUES[0],
        Role::Knight => PIECE_VALUES[1],
        Role::Bishop => PIECE_VALUES[2],
        Role::Rook => PIECE_VALUES[3],
        Role::Queen => PIECE_VALUES[4],
        Role::King => PIECE_VALUES[5],
    }
}

/// Return the value of the piece on `square`, or 0 if it is empty.
#[inline]
pub fn value_on(board: &Board, square: Square) -> i32 {
    board.role_at(square).map_or(0, piece_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_pieces_are_equal() {
        assert_eq!(piece_value(Role::Knight), piece_value(Role::Bishop));
    }

    #[test]
    fn king_outweighs_everything() {
        let rest: i32 = PIECE_VALUES[..5].iter().sum();
        assert!(piece_value(Role::King) > rest);
    }

    #[test]
    fn empty_square_is_worth_nothing() {
        let board = Board::new();
        assert_eq!(value_on(&board, Square::E4), 0);
        assert_eq!(value_on(&board, Square::D1), 900);
        assert_eq!(value_on(&board, Square::A7), 100);
    }
}
