//! Legal move generation.
//!
//! The generator produces a fully legal move set directly, without
//! make/verify filtering: checks are found by reverse attacks from the king,
//! pinned pieces are restricted to their pin ray, and king moves are vetted
//! against a danger map that sees through the king along checking rays.
//! En passant is the one case that falls back to simulation, because two
//! pieces leave a rank at once and ordinary pin detection cannot see the
//! resulting discoveries.

mod attacks;
mod pieces;
mod pins;

use super::attack_tables::{AttackTables, BETWEEN};
use super::state::Board;
use super::types::{Bitboard, Color, MoveList, Square};

/// Result of legal move generation for one position.
pub struct GeneratedMoves {
    /// Every legal move, in generation order
    pub moves: MoveList,
    /// Squares attacked by white / black, including defended own pieces
    pub attacked: [Bitboard; 2],
    /// Enemy pieces currently giving check
    pub checkers: Bitboard,
    pub in_check: bool,
    pub is_checkmate: bool,
}

impl GeneratedMoves {
    /// Not in check with no legal moves.
    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        !self.in_check && self.moves.is_empty()
    }
}

/// Per-position data threaded through the generation passes.
pub(crate) struct GenContext<'b> {
    pub(crate) board: &'b Board,
    pub(crate) us: Color,
    pub(crate) them: Color,
    pub(crate) king: Square,
    pub(crate) own_occ: u64,
    pub(crate) their_occ: u64,
    pub(crate) all_occ: u64,
    pub(crate) their_attacks: u64,
    /// Squares that resolve the current check (all squares when not in check)
    pub(crate) check_line: u64,
    /// Per-square movement restriction for pinned pieces (all squares when free)
    pub(crate) pin_masks: [u64; 64],
}

/// Legal move generator backed by precomputed attack tables.
pub struct MoveGenerator<'a> {
    pub(crate) tables: &'a AttackTables,
}

impl<'a> MoveGenerator<'a> {
    #[must_use]
    pub fn new(tables: &'a AttackTables) -> Self {
        MoveGenerator { tables }
    }

    /// Generate the full legal move set for the side to move, along with
    /// both sides' attacked-square maps and check/checkmate status.
    #[must_use]
    pub fn generate(&self, board: &Board) -> GeneratedMoves {
        let us = board.side_to_move();
        let them = us.opponent();
        let king = board.king_square(us);

        let our_attacks = self.attack_map(board, us);
        let their_attacks = self.attack_map(board, them);
        let checkers = self.checkers_of(board, us);
        let in_check = checkers.any();

        let check_line = if !in_check {
            !0u64
        } else if checkers.popcount() == 1 {
            let checker = checkers.0.trailing_zeros() as usize;
            BETWEEN[king.as_index()][checker] | checkers.0
        } else {
            // double check: no square resolves both lines
            0
        };

        let mut ctx = GenContext {
            board,
            us,
            them,
            king,
            own_occ: board.occupied_by(us).0,
            their_occ: board.occupied_by(them).0,
            all_occ: board.occupied_all().0,
            their_attacks: their_attacks.0,
            check_line,
            pin_masks: [!0u64; 64],
        };

        let mut moves = MoveList::new();
        self.king_moves(&ctx, in_check, &mut moves);

        // under double check only the king may move
        if checkers.popcount() <= 1 {
            self.fill_pin_masks(&mut ctx, checkers);
            self.knight_moves(&ctx, &mut moves);
            self.slider_moves(&ctx, &mut moves);
            self.pawn_moves(&ctx, &mut moves);
            if !in_check {
                self.castling_moves(&ctx, &mut moves);
            }
        }

        let attacked = match us {
            Color::White => [our_attacks, their_attacks],
            Color::Black => [their_attacks, our_attacks],
        };
        let is_checkmate = in_check && moves.is_empty();

        GeneratedMoves {
            moves,
            attacked,
            checkers,
            in_check,
            is_checkmate,
        }
    }

    /// Count leaf nodes of the legal move tree to a fixed depth.
    pub fn perft(&self, board: &mut Board, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }
        let generated = self.generate(board);
        if depth == 1 {
            return generated.moves.len() as u64;
        }

        let mut nodes = 0;
        for &mv in generated.moves.iter() {
            let info = board.make_move(mv);
            nodes += self.perft(board, depth - 1);
            board.unmake_move(mv, info);
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::test_util::tables;
    use crate::board::types::{Move, Piece};

    fn generate(fen: &str) -> GeneratedMoves {
        let board = Board::try_from_fen(fen).expect("valid test position");
        MoveGenerator::new(tables()).generate(&board)
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let board = Board::new();
        let generated = MoveGenerator::new(tables()).generate(&board);
        assert_eq!(generated.moves.len(), 20);
        assert!(!generated.in_check);
        assert!(!generated.is_checkmate);
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        // rook on e8 and bishop on h4 both check the e1 king
        let generated = generate("4r2k/8/8/8/7b/8/8/4K3 w - - 0 1");
        assert_eq!(generated.checkers.popcount(), 2);
        assert!(generated.in_check);
        for mv in generated.moves.iter() {
            assert_eq!(mv.piece(), Piece::King, "non-king move {mv}");
        }
    }

    #[test]
    fn checked_king_cannot_retreat_along_the_ray() {
        // the e-file rook checks; e1 is shadowed by the king and stays unsafe
        let generated = generate("4r2k/8/8/8/8/8/4K3/8 w - - 0 1");
        let illegal = Move::quiet(
            "e2".parse().unwrap(),
            "e1".parse().unwrap(),
            Piece::King,
        );
        assert!(generated.in_check);
        assert!(!generated.moves.contains(illegal));
    }

    #[test]
    fn check_can_be_blocked_or_the_checker_captured() {
        // rook checks on the e-file; Re2 blocks, Nxe8 resolves
        let generated = generate("4r2k/8/3N4/8/8/8/R7/4K3 w - - 0 1");
        let block = Move::quiet("a2".parse().unwrap(), "e2".parse().unwrap(), Piece::Rook);
        assert!(generated.moves.contains(block));
        assert!(generated
            .moves
            .iter()
            .any(|mv| mv.is_capture() && mv.to() == "e8".parse().unwrap()));
    }

    #[test]
    fn pinned_rook_slides_only_on_the_pin_ray() {
        let generated = generate("4r2k/8/8/8/8/4R3/8/4K3 w - - 0 1");
        for mv in generated.moves.iter().filter(|m| m.piece() == Piece::Rook) {
            assert_eq!(mv.to().file(), 4, "pinned rook left the e-file: {mv}");
        }
    }

    #[test]
    fn en_passant_that_exposes_the_king_is_excluded() {
        // capturing c6 en passant removes both pawns from rank 5 and lets
        // the h5 rook take the a5 king
        let generated = generate("7k/8/8/K1pP3r/8/8/8/8 w - c6 0 1");
        assert!(generated.moves.iter().all(|mv| !mv.is_en_passant()));
    }

    #[test]
    fn legal_en_passant_is_generated() {
        let generated = generate("7k/8/8/2pP4/8/8/8/K7 w - c6 0 1");
        let ep = Move::en_passant("d5".parse().unwrap(), "c6".parse().unwrap());
        assert!(generated.moves.contains(ep));
    }

    #[test]
    fn en_passant_capture_of_a_checking_pawn_is_legal() {
        // black's d-pawn just double-pushed and checks the c4 king;
        // exd6 en passant removes the checker
        let generated = generate("7k/8/8/3pP3/2K5/8/8/8 w - d6 0 1");
        assert!(generated.in_check);
        let ep = Move::en_passant("e5".parse().unwrap(), "d6".parse().unwrap());
        assert!(generated.moves.contains(ep));
    }

    #[test]
    fn castling_through_an_attacked_square_is_illegal() {
        // f1 is covered by the f8 rook, so only queenside castling remains
        let generated = generate("r4r1k/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!generated.moves.iter().any(|mv| mv.is_castle_kingside()));
        assert!(generated
            .moves
            .iter()
            .any(|mv| mv.is_castling() && !mv.is_castle_kingside()));
    }

    #[test]
    fn castling_rights_require_the_rook_at_home() {
        let generated = generate("7k/8/8/8/8/8/8/4K2R w Q - 0 1");
        assert!(!generated.moves.iter().any(|mv| mv.is_castling()));
    }

    #[test]
    fn no_castling_while_in_check() {
        let generated = generate("4r2k/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(generated.in_check);
        assert!(!generated.moves.iter().any(|mv| mv.is_castling()));
    }

    #[test]
    fn promotions_expand_to_four_pieces() {
        let generated = generate("7k/P7/8/8/8/8/8/K7 w - - 0 1");
        let promos: Vec<_> = generated
            .moves
            .iter()
            .filter(|mv| mv.is_promotion())
            .collect();
        assert_eq!(promos.len(), 4);
        let pieces: Vec<_> = promos.iter().filter_map(|mv| mv.promotion_piece()).collect();
        for piece in [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight] {
            assert!(pieces.contains(&piece));
        }
    }

    #[test]
    fn back_rank_mate_is_checkmate() {
        let generated = generate("3R2k1/5ppp/8/8/8/8/8/4K3 b - - 0 1");
        assert!(generated.in_check);
        assert!(generated.is_checkmate);
        assert!(generated.moves.is_empty());
    }

    #[test]
    fn stalemate_has_no_moves_and_no_check() {
        let generated = generate("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(!generated.in_check);
        assert!(generated.moves.is_empty());
        assert!(generated.is_stalemate());
        assert!(!generated.is_checkmate);
    }
}
