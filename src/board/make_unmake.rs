//! Applying and reverting moves with incremental hash maintenance.

use crate::zobrist::ZOBRIST;

use super::state::{Board, UnmakeInfo};
use super::types::{rights_cleared_by_square, Color, Move, Piece, Square};

impl Board {
    /// Apply a legal move in place, returning the data needed to revert it.
    ///
    /// The Zobrist hash is updated incrementally: codes are XOR-ed out for
    /// everything that leaves the board and XOR-ed in for everything that
    /// arrives, plus the en-passant, castling-rights and side-to-move
    /// toggles. After any legal sequence the incremental hash equals
    /// [`Board::calculate_hash`].
    pub fn make_move(&mut self, mv: Move) -> UnmakeInfo {
        let info = UnmakeInfo {
            previous_en_passant_target: self.en_passant_target,
            previous_castling_rights: self.castling_rights,
            previous_hash: self.hash,
            previous_halfmove_clock: self.halfmove_clock,
        };

        let us = self.side_to_move();
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();
        let piece = mv.piece();

        // stale en-passant code
        if let Some(ep) = self.en_passant_target {
            self.hash ^= ZOBRIST.en_passant_keys[ep.file()];
        }
        self.en_passant_target = None;

        // captured piece off the board
        if let Some(victim) = mv.captured() {
            let victim_sq = mv.en_passant_victim().unwrap_or(to);
            self.remove_piece(victim_sq, them, victim);
            self.hash ^=
                ZOBRIST.piece_keys[victim.index()][them.index()][victim_sq.as_index()];
        }

        // mover from origin to destination (or its promotion piece)
        self.remove_piece(from, us, piece);
        self.hash ^= ZOBRIST.piece_keys[piece.index()][us.index()][from.as_index()];

        let arriving = mv.promotion_piece().unwrap_or(piece);
        self.set_piece(to, us, arriving);
        self.hash ^= ZOBRIST.piece_keys[arriving.index()][us.index()][to.as_index()];

        // castling relocates the rook as part of the same move
        if mv.is_castling() {
            let (rook_from, rook_to) = rook_castling_squares(us, mv.is_castle_kingside());
            self.remove_piece(rook_from, us, Piece::Rook);
            self.set_piece(rook_to, us, Piece::Rook);
            self.hash ^=
                ZOBRIST.piece_keys[Piece::Rook.index()][us.index()][rook_from.as_index()];
            self.hash ^= ZOBRIST.piece_keys[Piece::Rook.index()][us.index()][rook_to.as_index()];
        }

        // double push sets the en-passant target behind the pawn
        if mv.is_double_pawn_push() {
            let target = Square((from.rank() + to.rank()) / 2, from.file());
            self.en_passant_target = Some(target);
            self.hash ^= ZOBRIST.en_passant_keys[target.file()];
        }

        // castling rights lost by moving from or onto key squares
        let new_rights = self.castling_rights
            & !rights_cleared_by_square(from.as_index())
            & !rights_cleared_by_square(to.as_index());
        if new_rights != self.castling_rights {
            self.hash ^= ZOBRIST.castling_keys[self.castling_rights as usize];
            self.hash ^= ZOBRIST.castling_keys[new_rights as usize];
            self.castling_rights = new_rights;
        }

        if piece == Piece::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.white_to_move = !self.white_to_move;
        self.hash ^= ZOBRIST.black_to_move_key;

        info
    }

    /// Revert a move applied by [`Board::make_move`].
    pub fn unmake_move(&mut self, mv: Move, info: UnmakeInfo) {
        self.white_to_move = !self.white_to_move;

        let us = self.side_to_move();
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();
        let piece = mv.piece();

        let arriving = mv.promotion_piece().unwrap_or(piece);
        self.remove_piece(to, us, arriving);
        self.set_piece(from, us, piece);

        if let Some(victim) = mv.captured() {
            let victim_sq = mv.en_passant_victim().unwrap_or(to);
            self.set_piece(victim_sq, them, victim);
        }

        if mv.is_castling() {
            let (rook_from, rook_to) = rook_castling_squares(us, mv.is_castle_kingside());
            self.remove_piece(rook_to, us, Piece::Rook);
            self.set_piece(rook_from, us, Piece::Rook);
        }

        self.en_passant_target = info.previous_en_passant_target;
        self.castling_rights = info.previous_castling_rights;
        self.hash = info.previous_hash;
        self.halfmove_clock = info.previous_halfmove_clock;
    }
}

/// The rook's origin and destination for a castle of the given side.
pub(crate) fn rook_castling_squares(color: Color, kingside: bool) -> (Square, Square) {
    let rank = color.back_rank();
    if kingside {
        (Square(rank, 7), Square(rank, 5))
    } else {
        (Square(rank, 0), Square(rank, 3))
    }
}
