//! Pin detection by virtual piece removal.

use super::{GenContext, MoveGenerator};
use crate::board::attack_tables::BETWEEN;
use crate::board::types::{Bitboard, Piece};

impl MoveGenerator<'_> {
    /// Restrict each absolutely pinned piece to the ray between its king and
    /// the pinning slider. A piece is pinned when lifting it off the board
    /// exposes the king to a slider that was not already giving check.
    pub(crate) fn fill_pin_masks(&self, ctx: &mut GenContext<'_>, checkers: Bitboard) {
        let king = ctx.king.as_index();
        let straight = ctx.board.piece_board(ctx.them, Piece::Rook).0
            | ctx.board.piece_board(ctx.them, Piece::Queen).0;
        let diagonal = ctx.board.piece_board(ctx.them, Piece::Bishop).0
            | ctx.board.piece_board(ctx.them, Piece::Queen).0;

        // only pieces the enemy attacks can be pinned, and only pieces that
        // share a ray with the king are worth testing
        let candidates =
            ctx.own_occ & ctx.their_attacks & self.tables.queen_attacks(king, ctx.all_occ);
        for sq in Bitboard(candidates).iter() {
            let lifted = ctx.all_occ ^ (1u64 << sq.as_usize());
            let exposed = (self.tables.rook_attacks(king, lifted) & straight)
                | (self.tables.bishop_attacks(king, lifted) & diagonal);
            let new_pinners = exposed & !checkers.0;
            if new_pinners != 0 {
                let pinner = new_pinners.trailing_zeros() as usize;
                ctx.pin_masks[sq.as_usize()] = BETWEEN[king][pinner] | (1u64 << pinner);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::state::Board;
    use crate::board::test_util::tables;
    use crate::board::types::{Color, Square};

    fn masks_for(fen: &str) -> [u64; 64] {
        let board = Board::try_from_fen(fen).expect("valid test position");
        let gen = MoveGenerator::new(tables());
        let us = board.side_to_move();
        let mut ctx = GenContext {
            us,
            them: us.opponent(),
            king: board.king_square(us),
            own_occ: board.occupied_by(us).0,
            their_occ: board.occupied_by(us.opponent()).0,
            all_occ: board.occupied_all().0,
            their_attacks: gen.attack_map(&board, us.opponent()).0,
            check_line: !0,
            pin_masks: [!0u64; 64],
            board: &board,
        };
        let checkers = gen.checkers_of(ctx.board, Color::White);
        gen.fill_pin_masks(&mut ctx, checkers);
        ctx.pin_masks
    }

    #[test]
    fn rook_pin_restricts_to_file() {
        // white knight on e4 pinned by the e8 rook
        let masks = masks_for("4r2k/8/8/8/4N3/8/8/4K3 w - - 0 1");
        let e4: Square = "e4".parse().unwrap();
        // the mask spans the full king-to-pinner ray, the pinned piece's
        // own square included (no move ever targets its own origin)
        let expected = ["e2", "e3", "e4", "e5", "e6", "e7", "e8"]
            .iter()
            .map(|s| 1u64 << s.parse::<Square>().unwrap().as_index())
            .fold(0, |acc, b| acc | b);
        assert_eq!(masks[e4.as_index()], expected);
    }

    #[test]
    fn unpinned_pieces_stay_unrestricted() {
        let masks = masks_for("4r2k/8/8/8/4N3/8/8/4K3 w - - 0 1");
        let a_square: Square = "h5".parse().unwrap();
        assert_eq!(masks[a_square.as_index()], !0);
    }

    #[test]
    fn blocked_ray_is_not_a_pin() {
        // two white pieces between king and rook: neither is pinned
        let masks = masks_for("4r2k/8/4P3/8/4N3/8/8/4K3 w - - 0 1");
        let e4: Square = "e4".parse().unwrap();
        let e6: Square = "e6".parse().unwrap();
        assert_eq!(masks[e4.as_index()], !0);
        assert_eq!(masks[e6.as_index()], !0);
    }
}
