//! Per-piece move emission.

use super::{GenContext, MoveGenerator};
use crate::board::attack_tables::{KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};
use crate::board::types::{
    castle_bit, Bitboard, Move, MoveList, Piece, Square, PROMOTION_PIECES,
};

impl MoveGenerator<'_> {
    /// King steps onto squares the enemy does not attack. While in check the
    /// danger map is recomputed with the king lifted off the board, so the
    /// king cannot retreat along a checking ray that its own body shadows.
    pub(crate) fn king_moves(&self, ctx: &GenContext<'_>, in_check: bool, moves: &mut MoveList) {
        let from = ctx.king;
        let mut danger = ctx.their_attacks;

        if in_check {
            let lifted = ctx.all_occ ^ (1u64 << from.as_index());
            let straight = ctx.board.piece_board(ctx.them, Piece::Rook).0
                | ctx.board.piece_board(ctx.them, Piece::Queen).0;
            let diagonal = ctx.board.piece_board(ctx.them, Piece::Bishop).0
                | ctx.board.piece_board(ctx.them, Piece::Queen).0;
            for sq in Bitboard(straight).iter() {
                danger |= self.tables.rook_attacks(sq.as_usize(), lifted);
            }
            for sq in Bitboard(diagonal).iter() {
                danger |= self.tables.bishop_attacks(sq.as_usize(), lifted);
            }
        }

        let targets = KING_ATTACKS[from.as_index()] & !ctx.own_occ & !danger;
        self.emit(ctx, from, Piece::King, targets, moves);
    }

    /// Castling while not in check: rights intact, rook still home, squares
    /// between empty, and neither the transit nor the destination square
    /// attacked.
    pub(crate) fn castling_moves(&self, ctx: &GenContext<'_>, moves: &mut MoveList) {
        let rank = ctx.us.back_rank();
        let from = Square(rank, 4);
        if ctx.king != from {
            return;
        }

        for kingside in [true, false] {
            if ctx.board.castling_rights & castle_bit(ctx.us, kingside) == 0 {
                continue;
            }
            let rook_file = if kingside { 7 } else { 0 };
            if !ctx
                .board
                .piece_board(ctx.us, Piece::Rook)
                .contains(Square(rank, rook_file))
            {
                continue;
            }
            let empty_files: &[usize] = if kingside { &[5, 6] } else { &[1, 2, 3] };
            if empty_files
                .iter()
                .any(|&f| ctx.all_occ & (1u64 << Square(rank, f).as_index()) != 0)
            {
                continue;
            }
            let (transit, dest) = if kingside {
                (Square(rank, 5), Square(rank, 6))
            } else {
                (Square(rank, 3), Square(rank, 2))
            };
            let attacked = (1u64 << transit.as_index()) | (1u64 << dest.as_index());
            if ctx.their_attacks & attacked != 0 {
                continue;
            }
            moves.push(if kingside {
                Move::castle_kingside(from, dest)
            } else {
                Move::castle_queenside(from, dest)
            });
        }
    }

    pub(crate) fn knight_moves(&self, ctx: &GenContext<'_>, moves: &mut MoveList) {
        for sq in ctx.board.piece_board(ctx.us, Piece::Knight).iter() {
            let from = Square::from_index(sq);
            let targets = KNIGHT_ATTACKS[sq.as_usize()]
                & !ctx.own_occ
                & ctx.check_line
                & ctx.pin_masks[sq.as_usize()];
            self.emit(ctx, from, Piece::Knight, targets, moves);
        }
    }

    pub(crate) fn slider_moves(&self, ctx: &GenContext<'_>, moves: &mut MoveList) {
        for sq in ctx.board.piece_board(ctx.us, Piece::Bishop).iter() {
            let targets = self.tables.bishop_attacks(sq.as_usize(), ctx.all_occ)
                & !ctx.own_occ
                & ctx.check_line
                & ctx.pin_masks[sq.as_usize()];
            self.emit(ctx, Square::from_index(sq), Piece::Bishop, targets, moves);
        }
        for sq in ctx.board.piece_board(ctx.us, Piece::Rook).iter() {
            let targets = self.tables.rook_attacks(sq.as_usize(), ctx.all_occ)
                & !ctx.own_occ
                & ctx.check_line
                & ctx.pin_masks[sq.as_usize()];
            self.emit(ctx, Square::from_index(sq), Piece::Rook, targets, moves);
        }
        for sq in ctx.board.piece_board(ctx.us, Piece::Queen).iter() {
            let targets = self.tables.queen_attacks(sq.as_usize(), ctx.all_occ)
                & !ctx.own_occ
                & ctx.check_line
                & ctx.pin_masks[sq.as_usize()];
            self.emit(ctx, Square::from_index(sq), Piece::Queen, targets, moves);
        }
    }

    pub(crate) fn pawn_moves(&self, ctx: &GenContext<'_>, moves: &mut MoveList) {
        let dir = ctx.us.pawn_direction();
        let promo_rank = ctx.us.promotion_rank();
        let start_rank = ctx.us.pawn_start_rank();

        for sq in ctx.board.piece_board(ctx.us, Piece::Pawn).iter() {
            let from = Square::from_index(sq);
            let allowed = ctx.check_line & ctx.pin_masks[sq.as_usize()];

            let ahead_rank = (from.rank() as isize + dir) as usize;
            let ahead = Square(ahead_rank, from.file());
            if ctx.board.is_empty_square(ahead) {
                if allowed & (1u64 << ahead.as_index()) != 0 {
                    if ahead_rank == promo_rank {
                        for promo in PROMOTION_PIECES {
                            moves.push(Move::promotion(from, ahead, promo, None));
                        }
                    } else {
                        moves.push(Move::quiet(from, ahead, Piece::Pawn));
                    }
                }
                if from.rank() == start_rank {
                    let double = Square((ahead_rank as isize + dir) as usize, from.file());
                    if ctx.board.is_empty_square(double)
                        && allowed & (1u64 << double.as_index()) != 0
                    {
                        moves.push(Move::double_pawn_push(from, double));
                    }
                }
            }

            let captures = PAWN_ATTACKS[ctx.us.index()][sq.as_usize()] & ctx.their_occ & allowed;
            for target in Bitboard(captures).iter() {
                let to = Square::from_index(target);
                let victim = ctx
                    .board
                    .piece_at(to)
                    .map(|(_, piece)| piece)
                    .unwrap_or(Piece::Pawn);
                if to.rank() == promo_rank {
                    for promo in PROMOTION_PIECES {
                        moves.push(Move::promotion(from, to, promo, Some(victim)));
                    }
                } else {
                    moves.push(Move::capture(from, to, Piece::Pawn, victim));
                }
            }

            if let Some(ep) = ctx.board.en_passant_target() {
                if PAWN_ATTACKS[ctx.us.index()][sq.as_usize()] & (1u64 << ep.as_index()) != 0
                    && self.en_passant_is_legal(ctx, from, ep)
                {
                    moves.push(Move::en_passant(from, ep));
                }
            }
        }
    }

    /// En passant removes two pieces from the capture rank at once, which
    /// ordinary pin masks cannot model. Play the capture out on the occupancy
    /// bitboards and test whether the king ends up attacked.
    fn en_passant_is_legal(&self, ctx: &GenContext<'_>, from: Square, ep: Square) -> bool {
        let victim = Square(from.rank(), ep.file());
        let occ = (ctx.all_occ ^ (1u64 << from.as_index()) ^ (1u64 << victim.as_index()))
            | (1u64 << ep.as_index());

        let king = ctx.king.as_index();
        let straight = ctx.board.piece_board(ctx.them, Piece::Rook).0
            | ctx.board.piece_board(ctx.them, Piece::Queen).0;
        let diagonal = ctx.board.piece_board(ctx.them, Piece::Bishop).0
            | ctx.board.piece_board(ctx.them, Piece::Queen).0;
        let pawns = ctx.board.piece_board(ctx.them, Piece::Pawn).0 & !(1u64 << victim.as_index());

        let mut attackers = self.tables.rook_attacks(king, occ) & straight;
        attackers |= self.tables.bishop_attacks(king, occ) & diagonal;
        attackers |= KNIGHT_ATTACKS[king] & ctx.board.piece_board(ctx.them, Piece::Knight).0;
        attackers |= PAWN_ATTACKS[ctx.us.index()][king] & pawns;
        attackers == 0
    }

    /// Turn a target bitboard into quiet and capture moves for one piece.
    fn emit(
        &self,
        ctx: &GenContext<'_>,
        from: Square,
        piece: Piece,
        targets: u64,
        moves: &mut MoveList,
    ) {
        for target in Bitboard(targets).iter() {
            let to = Square::from_index(target);
            if ctx.their_occ & (1u64 << to.as_index()) != 0 {
                let victim = ctx
                    .board
                    .piece_at(to)
                    .map(|(_, piece)| piece)
                    .unwrap_or(Piece::Pawn);
                moves.push(Move::capture(from, to, piece, victim));
            } else {
                moves.push(Move::quiet(from, to, piece));
            }
        }
    }
}
