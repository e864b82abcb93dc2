//! Attack maps and check detection.

use super::MoveGenerator;
use crate::board::attack_tables::{KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};
use crate::board::state::Board;
use crate::board::types::{Bitboard, Color, Piece};

impl MoveGenerator<'_> {
    /// Every square `color` attacks, including its own occupied squares.
    /// Defended pieces stay in the map so the opposing king cannot
    /// capture them.
    #[must_use]
    pub(crate) fn attack_map(&self, board: &Board, color: Color) -> Bitboard {
        let occ = board.occupied_all().0;
        let mut attacks = 0u64;

        let pawns = board.piece_board(color, Piece::Pawn);
        let forward = match color {
            Color::White => pawns.shift_north(),
            Color::Black => pawns.shift_south(),
        };
        attacks |= forward.shift_east().0 | forward.shift_west().0;

        for sq in board.piece_board(color, Piece::Knight).iter() {
            attacks |= KNIGHT_ATTACKS[sq.as_usize()];
        }
        attacks |= KING_ATTACKS[board.king_square(color).as_index()];

        let straight =
            board.piece_board(color, Piece::Rook).0 | board.piece_board(color, Piece::Queen).0;
        for sq in Bitboard(straight).iter() {
            attacks |= self.tables.rook_attacks(sq.as_usize(), occ);
        }
        let diagonal =
            board.piece_board(color, Piece::Bishop).0 | board.piece_board(color, Piece::Queen).0;
        for sq in Bitboard(diagonal).iter() {
            attacks |= self.tables.bishop_attacks(sq.as_usize(), occ);
        }

        Bitboard(attacks)
    }

    /// Enemy pieces giving check to `color`'s king, found by projecting each
    /// piece kind's attacks out from the king square.
    #[must_use]
    pub(crate) fn checkers_of(&self, board: &Board, color: Color) -> Bitboard {
        let them = color.opponent();
        let king = board.king_square(color).as_index();
        let occ = board.occupied_all().0;

        let straight =
            board.piece_board(them, Piece::Rook).0 | board.piece_board(them, Piece::Queen).0;
        let diagonal =
            board.piece_board(them, Piece::Bishop).0 | board.piece_board(them, Piece::Queen).0;

        let mut checkers = KNIGHT_ATTACKS[king] & board.piece_board(them, Piece::Knight).0;
        checkers |= PAWN_ATTACKS[color.index()][king] & board.piece_board(them, Piece::Pawn).0;
        checkers |= self.tables.rook_attacks(king, occ) & straight;
        checkers |= self.tables.bishop_attacks(king, occ) & diagonal;

        Bitboard(checkers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::test_util::tables;

    #[test]
    fn start_position_attack_map() {
        let board = Board::new();
        let gen = MoveGenerator::new(tables());
        let white = gen.attack_map(&board, Color::White);
        // pawns and knights reach rank 3 at most
        assert_eq!(white.0 & Bitboard::RANK_4.0, 0);
        assert_eq!(white.0 & Bitboard::RANK_2.0, Bitboard::RANK_2.0);
    }

    #[test]
    fn attack_map_includes_defended_pieces() {
        // a defended pawn must appear in its own side's attack map
        let board =
            Board::try_from_fen("8/8/8/8/8/3P4/2P5/K6k w - - 0 1").expect("valid test position");
        let gen = MoveGenerator::new(tables());
        let white = gen.attack_map(&board, Color::White);
        assert!(white.contains("d3".parse().unwrap()));
    }

    #[test]
    fn finds_slider_checker_through_open_file() {
        let board = Board::try_from_fen("4r2k/8/8/8/8/8/8/4K3 w - - 0 1").expect("valid");
        let gen = MoveGenerator::new(tables());
        let checkers = gen.checkers_of(&board, Color::White);
        assert_eq!(checkers.popcount(), 1);
        assert!(checkers.contains("e8".parse().unwrap()));
    }

    #[test]
    fn pawn_check_is_detected() {
        let board = Board::try_from_fen("7k/8/8/8/8/3p4/4K3/8 w - - 0 1").expect("valid");
        let gen = MoveGenerator::new(tables());
        let checkers = gen.checkers_of(&board, Color::White);
        assert!(checkers.contains("d3".parse().unwrap()));
    }

    #[test]
    fn blocked_slider_gives_no_check() {
        let board = Board::try_from_fen("4r2k/8/8/4P3/8/8/8/4K3 w - - 0 1").expect("valid");
        let gen = MoveGenerator::new(tables());
        assert!(gen.checkers_of(&board, Color::White).is_empty());
    }
}
